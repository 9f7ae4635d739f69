//! # sugang-recommend
//!
//! The recommendation pipeline on top of `sugang-core` and `sugang-schema`:
//! candidate pool loading, curriculum-required lecture injection, per-pool
//! quotas and the category-keyed result.
//!
//! ```rust
//! use ahash::AHashMap;
//! use sugang_core::{ExclusionSet, LectureId, LectureMetadata, LectureVector, Vector};
//! use sugang_recommend::{recommend, CandidatePool, RequiredLecture};
//! use sugang_schema::{FeatureSchema, PreferenceField, UserPreference};
//!
//! let mut data = vec![0.0; 20];
//! data[17] = 1.0;
//! let lecture = LectureVector::new(
//!     LectureId::new("글쓰기", "한"),
//!     Vector::new(data),
//!     LectureMetadata::default(),
//! );
//! let pool = CandidatePool::new("liberal", FeatureSchema::liberal(), vec![lecture]);
//!
//! let preference = UserPreference::new().with(PreferenceField::Campus, "수정");
//! let mut required = AHashMap::new();
//! required.insert("liberal".to_string(), vec![RequiredLecture::new("파이썬프로그래밍", "장재경")]);
//! let mut quotas = AHashMap::new();
//! quotas.insert("liberal".to_string(), 15);
//!
//! let recs = recommend(&preference, &[pool], &ExclusionSet::new(), &required, &quotas).unwrap();
//! assert_eq!(recs.get("liberal").unwrap().len(), 2);
//! ```

pub mod catalog;
pub mod config;
pub mod credits;
pub mod engine;
pub mod error;
pub mod inject;
pub mod pool;
pub mod record;

pub use catalog::{CurriculumCatalog, CurriculumRule};
pub use config::{PoolConfig, PoolScope, RecommendConfig};
pub use credits::{summarize, taken_courses, CompletedCourse, CreditCategory, CreditSummary, GRADUATION_CREDITS};
pub use engine::{recommend, Recommender, StudentRequest};
pub use error::{RecommendError, Result};
pub use inject::{inject, RequiredLecture};
pub use pool::{CandidatePool, LectureRow, PoolRegistry};
pub use record::{RecommendationRecord, RecordSource, Recommendations, CURRICULUM_REQUIRED};
