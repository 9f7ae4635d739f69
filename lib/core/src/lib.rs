//! # sugang Core
//!
//! Core types for the sugang lecture recommender.
//!
//! - [`Vector`] - Dense feature vector with cosine helpers
//! - [`LectureVector`] - A candidate lecture: identity, vector, display metadata
//! - [`rank`] - Cosine ranking of a pool against one user vector
//! - [`ExclusionSet`] - Course-name exclusion and identity deduplication
//!
//! ## Example
//!
//! ```rust
//! use sugang_core::{rank, apply_exclusions, ExclusionSet, LectureId, LectureMetadata, LectureVector, Vector};
//!
//! let pool = vec![
//!     LectureVector::new(LectureId::new("자료구조", "김"), Vector::new(vec![1.0, 0.0]), LectureMetadata::default()),
//!     LectureVector::new(LectureId::new("알고리즘", "이"), Vector::new(vec![0.6, 0.8]), LectureMetadata::default()),
//! ];
//! let user = Vector::new(vec![1.0, 0.0]);
//!
//! let ranked = rank(&user, &pool).unwrap();
//! let exclusions: ExclusionSet = ["자료구조"].into_iter().collect();
//! let remaining = apply_exclusions(ranked, &exclusions);
//! assert_eq!(remaining[0].lecture.id.course, "알고리즘");
//! ```

pub mod vector;
pub mod error;
pub mod lecture;
pub mod filter;
pub mod ranker;

pub use vector::Vector;
pub use error::{Error, Result};
pub use lecture::{course_key, LectureId, LectureMetadata, LectureVector};
pub use filter::{apply_exclusions, dedup_identities, retain_matching, ExclusionSet, Filter, FilterCondition, MetadataFilter};
pub use ranker::{rank, RankedCandidate};
