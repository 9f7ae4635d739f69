//! Mandatory course injection
//!
//! Curriculum-required lectures lead a category list. Similarity results
//! fill whatever room the quota leaves, after exclusions.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use sugang_core::{apply_exclusions, ExclusionSet, LectureId, LectureMetadata, RankedCandidate};
use sugang_schema::Labels;
use crate::record::RecommendationRecord;

/// A lecture the curriculum mandates for some students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredLecture {
    #[serde(alias = "과목명")]
    pub course: String,

    #[serde(default, alias = "교수명")]
    pub instructor: String,

    #[serde(flatten)]
    pub metadata: LectureMetadata,
}

impl RequiredLecture {
    pub fn new(course: impl Into<String>, instructor: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            instructor: instructor.into(),
            metadata: LectureMetadata::default(),
        }
    }

    pub fn id(&self) -> LectureId {
        LectureId::new(self.course.clone(), self.instructor.clone())
    }
}

/// Merge required lectures and ranked candidates into one list
///
/// Required entries come first, in their given order, deduplicated by
/// (course, instructor); they are cut only when they alone exceed `quota`.
/// Every listed course name is added to `exclusions`, so ranked candidates
/// with the same name are skipped here and in any later list built with the
/// same set. `explain` produces the labels of each similarity entry.
pub fn inject<F>(
    required: &[RequiredLecture],
    ranked: Vec<RankedCandidate>,
    exclusions: &mut ExclusionSet,
    quota: usize,
    mut explain: F,
) -> Vec<RecommendationRecord>
where
    F: FnMut(&RankedCandidate) -> Labels,
{
    let mut records = Vec::with_capacity(quota);
    let mut seen = AHashSet::new();

    for lecture in required {
        if records.len() == quota {
            break;
        }
        let id = lecture.id();
        if seen.insert(id.identity_key()) {
            exclusions.insert(&id.course);
            records.push(RecommendationRecord::required(&id, &lecture.metadata));
        }
    }

    let required_count = records.len();
    let remaining = quota - required_count;
    if remaining == 0 {
        return records;
    }

    for candidate in apply_exclusions(ranked, exclusions).into_iter().take(remaining) {
        let labels = explain(&candidate);
        records.push(RecommendationRecord::matched(&candidate, labels));
    }
    // after the pass so sections of one course with different instructors
    // can share this list
    for record in &records[required_count..] {
        exclusions.insert(&record.course);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CURRICULUM_REQUIRED;
    use sugang_core::{LectureVector, Vector};

    fn ranked(n: usize) -> Vec<RankedCandidate> {
        (0..n)
            .map(|i| RankedCandidate {
                lecture: LectureVector::new(
                    LectureId::new(format!("과목{}", i), format!("교수{}", i)),
                    Vector::new(vec![1.0, 0.0]),
                    LectureMetadata::default(),
                ),
                score: 1.0 - i as f32 * 0.01,
            })
            .collect()
    }

    fn no_labels(_: &RankedCandidate) -> Labels {
        Labels::new()
    }

    #[test]
    fn test_required_first_then_ranked() {
        let required = vec![RequiredLecture::new("파이썬프로그래밍", "장재경")];
        let mut exclusions = ExclusionSet::new();
        let records = inject(&required, ranked(20), &mut exclusions, 9, no_labels);

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].course, "파이썬프로그래밍");
        assert_eq!(records[0].labels[0], CURRICULUM_REQUIRED);
        for (i, record) in records[1..].iter().enumerate() {
            assert_eq!(record.course, format!("과목{}", i));
            assert!(!record.is_required());
        }
    }

    #[test]
    fn test_required_truncated_only_past_quota() {
        let required: Vec<_> = (0..4).map(|i| RequiredLecture::new(format!("필수{}", i), "")).collect();
        let mut exclusions = ExclusionSet::new();
        let records = inject(&required, ranked(5), &mut exclusions, 3, no_labels);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.is_required()));
        assert_eq!(records[2].course, "필수2");
        // the cut entry was never listed
        assert!(!exclusions.contains("필수3"));
    }

    #[test]
    fn test_required_deduplicated() {
        let required = vec![
            RequiredLecture::new("글쓰기", "한"),
            RequiredLecture::new(" 글쓰기", "한 "),
            RequiredLecture::new("글쓰기", "박"),
        ];
        let mut exclusions = ExclusionSet::new();
        let records = inject(&required, Vec::new(), &mut exclusions, 5, no_labels);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].instructor, "박");
    }

    #[test]
    fn test_required_names_exclude_ranked_duplicates() {
        let mut candidates = ranked(3);
        candidates[0].lecture.id.course = "파이썬프로그래밍".to_string();
        let required = vec![RequiredLecture::new("파이썬프로그래밍", "장재경")];
        let mut exclusions = ExclusionSet::new();
        let records = inject(&required, candidates, &mut exclusions, 5, no_labels);

        let names: Vec<_> = records.iter().map(|r| r.course.as_str()).collect();
        assert_eq!(names, vec!["파이썬프로그래밍", "과목1", "과목2"]);
        assert!(exclusions.contains("과목1"));
    }

    #[test]
    fn test_quota_never_exceeded() {
        for quota in 0..6 {
            let required = vec![RequiredLecture::new("필수", "")];
            let mut exclusions = ExclusionSet::new();
            let records = inject(&required, ranked(10), &mut exclusions, quota, no_labels);
            assert_eq!(records.len(), quota);
        }
    }

    #[test]
    fn test_explain_called_for_similarity_entries() {
        let mut calls = 0;
        let mut exclusions = ExclusionSet::new();
        let records = inject(&[], ranked(4), &mut exclusions, 2, |c| {
            calls += 1;
            let mut labels = Labels::new();
            labels.push(format!("{:.2}", c.score));
            labels
        });
        assert_eq!(calls, 2);
        assert_eq!(records[0].labels[0], "1.00");
        assert!((records[1].score.unwrap() - 0.99).abs() < 1e-6);
    }
}
