//! # sugang
//!
//! A lecture recommender for course registration. A student's stated
//! preferences (exam count, assignment load, attendance style, campus,
//! rating...) are encoded into the same feature space as precomputed
//! lecture vectors, candidates are ranked by cosine similarity, and the
//! curriculum's required lectures are injected ahead of the ranked ones.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! sugang recommend --request request.json --data-dir ./data --pretty
//! sugang schema liberal
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use sugang::prelude::*;
//!
//! let schema = FeatureSchema::liberal();
//! let preference = UserPreference::new()
//!     .with(PreferenceField::Exam, "두 번")
//!     .with(PreferenceField::Campus, "수정");
//! let user = vectorize(&preference, &schema);
//!
//! let mut data = vec![0.0; schema.dimension_count()];
//! data[17] = 1.0;
//! let lecture = LectureVector::new(
//!     LectureId::new("기초 통계학", "원형묵"),
//!     Vector::new(data),
//!     LectureMetadata::default(),
//! );
//!
//! let ranked = rank(&user, &[lecture]).unwrap();
//! let labels = explain(&user, &ranked[0].lecture.vector, &schema);
//! assert!(labels.iter().any(|l| l == "수정캠퍼스"));
//! ```
//!
//! ## Crate Structure
//!
//! - `sugang-core` - Lecture vectors, cosine ranking, exclusion and dedup
//! - `sugang-schema` - Feature schemas, preference vectorizer, explanations
//! - `sugang-recommend` - Pools, curriculum catalog, injection, configuration

pub use ahash::AHashMap;

// Re-export core types
pub use sugang_core::{
    apply_exclusions, rank, ExclusionSet, Filter, FilterCondition, LectureId, LectureMetadata,
    LectureVector, MetadataFilter, RankedCandidate, Vector, Error, Result,
};

// Re-export schema
pub use sugang_schema::{
    explain, vectorize, FeatureSchema, Labels, PreferenceField, SchemaKind, StudentProfile,
    UserPreference, Vectorizer,
};

// Re-export pipeline
pub use sugang_recommend::{
    recommend, CandidatePool, CurriculumCatalog, PoolRegistry, RecommendConfig, RecommendError,
    RecommendationRecord, Recommendations, Recommender, RequiredLecture, StudentRequest,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AHashMap,
        apply_exclusions, rank, ExclusionSet, FilterCondition, LectureId, LectureMetadata,
        LectureVector, RankedCandidate, Vector,
        explain, vectorize, FeatureSchema, PreferenceField, SchemaKind, UserPreference,
        recommend, CandidatePool, RecommendConfig, RecommendationRecord, Recommender,
        RequiredLecture, StudentRequest,
    };
}
