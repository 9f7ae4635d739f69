//! Output records of a recommendation request.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use sugang_core::{LectureId, LectureMetadata, RankedCandidate};
use sugang_schema::Labels;

/// Sentinel label carried by every curriculum-mandated entry
pub const CURRICULUM_REQUIRED: &str = "curriculum-required";

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Required,
    Similarity,
}

/// One entry of a category list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub course: String,
    pub instructor: String,

    #[serde(flatten)]
    pub metadata: LectureMetadata,

    pub source: RecordSource,

    /// Cosine similarity; absent for required entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,

    pub labels: Labels,
}

impl RecommendationRecord {
    pub fn required(id: &LectureId, metadata: &LectureMetadata) -> Self {
        let mut labels = Labels::new();
        labels.push(CURRICULUM_REQUIRED.to_string());
        Self {
            course: id.course.clone(),
            instructor: id.instructor.clone(),
            metadata: metadata.clone(),
            source: RecordSource::Required,
            score: None,
            labels,
        }
    }

    pub fn matched(candidate: &RankedCandidate, labels: Labels) -> Self {
        let lecture = &candidate.lecture;
        Self {
            course: lecture.id.course.clone(),
            instructor: lecture.id.instructor.clone(),
            metadata: lecture.metadata.clone(),
            source: RecordSource::Similarity,
            score: Some(candidate.score),
            labels,
        }
    }

    pub fn id(&self) -> LectureId {
        LectureId::new(self.course.clone(), self.instructor.clone())
    }

    pub fn is_required(&self) -> bool {
        self.source == RecordSource::Required
    }
}

/// Category lists in pool order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    sections: Vec<(String, Vec<RecommendationRecord>)>,
}

impl Recommendations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: impl Into<String>, records: Vec<RecommendationRecord>) {
        self.sections.push((category.into(), records));
    }

    pub fn get(&self, category: &str) -> Option<&[RecommendationRecord]> {
        self.sections
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, records)| records.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RecommendationRecord])> {
        self.sections.iter().map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total records across all categories
    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|(_, records)| records.len()).sum()
    }
}

// Serialized as a JSON object whose keys keep pool order
impl Serialize for Recommendations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (category, records) in &self.sections {
            map.serialize_entry(category, records)?;
        }
        map.end()
    }
}
