//! # sugang Schema
//!
//! Fixed-layout feature encoding for lecture recommendation.
//!
//! ## Overview
//!
//! Lecture rows arrive with precomputed vectors. To compare a student with
//! them, the student's form answers are encoded with the same
//! [`FeatureSchema`] that produced the pool, and matches are explained by
//! mapping the strongest dimensions back to labels with that same table.
//!
//! ```rust
//! use sugang_schema::{explain, vectorize, FeatureSchema, PreferenceField, UserPreference};
//!
//! let schema = FeatureSchema::liberal();
//! let preference = UserPreference::new()
//!     .with(PreferenceField::Exam, "두 번")
//!     .with(PreferenceField::Campus, "수정");
//!
//! let user = vectorize(&preference, &schema);
//! assert_eq!(user.dim(), schema.dimension_count());
//!
//! let labels = explain(&user, &user, &schema);
//! assert!(labels.len() <= 3);
//! ```
//!
//! ## Layouts
//!
//! ```text
//! major   (18): class_format x3 | attendance | exam | assignment | group_work
//!               | grading | lecture_time | lecture_quality | rating
//! liberal (20): exam | assignment | group_work | attendance | grading
//!               | lecture_time | lecture_quality | class_format x3 | campus | rating
//! ```

pub mod preference;
pub mod schema;
pub mod vectorizer;
pub mod explain;

// Re-export main types
pub use preference::{PreferenceField, StudentProfile, UserPreference};
pub use schema::{
    FeatureSchema,
    FieldBlock,
    Encoding,
    EncodingKind,
    ContributionScheme,
    DimensionInfo,
    SchemaKind,
    SchemaError,
};
pub use vectorizer::{vectorize, Vectorizer};
pub use explain::{contributions, explain, Labels, MAX_LABELS};
