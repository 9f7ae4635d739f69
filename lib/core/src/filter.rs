//! Candidate filtering: metadata scoping, course exclusion and identity dedup.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use crate::lecture::{course_key, LectureVector};

pub trait Filter {
    fn matches(&self, lecture: &LectureVector) -> bool;
}

/// Condition over a lecture's identity and metadata fields
///
/// Field names are those understood by [`LectureVector::field`]. A missing
/// field never satisfies a positive condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    Contains { field: String, value: String },
    In { field: String, values: Vec<String> },
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

impl FilterCondition {
    pub fn equals(field: &str, value: impl Into<String>) -> Self {
        FilterCondition::Equals { field: field.to_string(), value: value.into() }
    }

    pub fn contains(field: &str, value: impl Into<String>) -> Self {
        FilterCondition::Contains { field: field.to_string(), value: value.into() }
    }

    pub fn one_of(field: &str, values: Vec<String>) -> Self {
        FilterCondition::In { field: field.to_string(), values }
    }
}

pub struct MetadataFilter {
    condition: FilterCondition,
}

impl MetadataFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    fn field_value(lecture: &LectureVector, field: &str) -> Option<String> {
        lecture.field(field).map(|v| v.trim().to_string())
    }

    fn matches_condition(condition: &FilterCondition, lecture: &LectureVector) -> bool {
        match condition {
            FilterCondition::Equals { field, value } => {
                Self::field_value(lecture, field)
                    .map(|v| v == value.trim())
                    .unwrap_or(false)
            }
            FilterCondition::NotEquals { field, value } => {
                Self::field_value(lecture, field)
                    .map(|v| v != value.trim())
                    .unwrap_or(true)
            }
            FilterCondition::Contains { field, value } => {
                Self::field_value(lecture, field)
                    .map(|v| v.contains(value.as_str()))
                    .unwrap_or(false)
            }
            FilterCondition::In { field, values } => {
                Self::field_value(lecture, field)
                    .map(|v| values.iter().any(|candidate| candidate.trim() == v))
                    .unwrap_or(false)
            }
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, lecture))
            }
            FilterCondition::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, lecture))
            }
            FilterCondition::Not(condition) => {
                !Self::matches_condition(condition, lecture)
            }
        }
    }
}

impl Filter for MetadataFilter {
    fn matches(&self, lecture: &LectureVector) -> bool {
        Self::matches_condition(&self.condition, lecture)
    }
}

/// Course names to keep out of similarity results
///
/// Keys are normalized with [`course_key`]; the instructor is not part of
/// the key, so a course taken before is excluded whoever teaches it now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    keys: AHashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, course: &str) -> bool {
        self.keys.insert(course_key(course))
    }

    pub fn contains(&self, course: &str) -> bool {
        self.keys.contains(&course_key(course))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Merge another set into this one
    pub fn union_with(&mut self, other: &ExclusionSet) {
        self.keys.extend(other.keys.iter().cloned());
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ExclusionSet::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for ExclusionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for course in iter {
            self.insert(course.as_ref());
        }
    }
}

impl Filter for ExclusionSet {
    fn matches(&self, lecture: &LectureVector) -> bool {
        !self.contains(&lecture.id.course)
    }
}

/// Keep only the candidates accepted by `filter`, preserving order
pub fn retain_matching<T, F>(candidates: Vec<T>, filter: &F) -> Vec<T>
where
    T: AsRef<LectureVector>,
    F: Filter + ?Sized,
{
    candidates
        .into_iter()
        .filter(|c| filter.matches(c.as_ref()))
        .collect()
}

/// Drop later occurrences of an already-seen (course, instructor) pair
pub fn dedup_identities<T: AsRef<LectureVector>>(candidates: Vec<T>) -> Vec<T> {
    let mut seen = AHashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.as_ref().id.identity_key()))
        .collect()
}

/// Exclusion pass followed by identity deduplication
///
/// The input is expected in ranked order, so the first (best) occurrence
/// of each identity is the one kept. Applying the same set twice is a no-op.
pub fn apply_exclusions<T: AsRef<LectureVector>>(candidates: Vec<T>, exclusions: &ExclusionSet) -> Vec<T> {
    dedup_identities(retain_matching(candidates, exclusions))
}

impl AsRef<LectureVector> for LectureVector {
    fn as_ref(&self) -> &LectureVector {
        self
    }
}
