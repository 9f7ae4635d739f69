//! Candidate pools: loading precomputed lecture vectors and sharing them
//! between requests.
//!
//! Rows come from the scraping/vectorizing side as JSON objects keyed by
//! the original column names. A row that cannot be turned into a valid
//! lecture for its schema is dropped with a warning; the rest of the pool
//! still loads.

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use sugang_core::{Error as CoreError, LectureId, LectureMetadata, LectureVector, Vector};
use sugang_schema::{Encoding, FeatureSchema, PreferenceField};
use tracing::{info, warn};
use crate::error::Result;

/// Raw pool row as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct LectureRow {
    #[serde(default, alias = "과목명", deserialize_with = "lenient_text")]
    pub course: Option<String>,
    #[serde(default, alias = "교수명", deserialize_with = "lenient_text")]
    pub instructor: Option<String>,
    #[serde(default, alias = "영역", deserialize_with = "lenient_text")]
    pub area: Option<String>,
    /// Campus name, or a one-hot literal such as `[1, 0]`
    #[serde(default, alias = "캠퍼스")]
    pub campus: Option<Value>,
    #[serde(default, alias = "시간표", deserialize_with = "lenient_text")]
    pub timetable: Option<String>,
    #[serde(default, alias = "개설학과전공", deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(default, alias = "이수구분", deserialize_with = "lenient_text")]
    pub completion: Option<String>,
    #[serde(default, alias = "학년", deserialize_with = "lenient_text")]
    pub grade: Option<String>,
    /// Feature vector, either a JSON array or its string rendering
    #[serde(default, alias = "전체 벡터", alias = "전체벡터")]
    pub vector: Option<Value>,
}

/// Accept strings, numbers and booleans as text; anything else is absent
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl LectureRow {
    /// Validate the row against `schema` and build a lecture
    pub fn into_lecture(self, schema: &FeatureSchema) -> sugang_core::Result<LectureVector> {
        let course = self
            .course
            .ok_or_else(|| CoreError::InvalidRow("missing course name".to_string()))?;
        // team-taught and unassigned sections leave the instructor blank
        let instructor = self.instructor.unwrap_or_default();

        let raw_vector = self
            .vector
            .ok_or_else(|| CoreError::InvalidRow(format!("'{}' has no vector", course)))?;
        let data = parse_numbers(&raw_vector)
            .ok_or_else(|| CoreError::InvalidRow(format!("'{}' has an unparseable vector", course)))?;

        let expected = schema.dimension_count();
        if data.len() != expected {
            return Err(CoreError::InvalidRow(format!(
                "'{}' has {} dimensions, schema {} expects {}",
                course,
                data.len(),
                schema.id(),
                expected
            )));
        }

        let metadata = LectureMetadata {
            area: self.area,
            campus: self.campus.as_ref().and_then(|c| decode_campus(c, schema)),
            timetable: self.timetable,
            department: self.department,
            // "공통 교양" and "공통교양" are the same category
            completion: self.completion.map(|c| c.split_whitespace().collect()),
            grade: self.grade.and_then(|g| g.trim_end_matches("학년").trim().parse().ok()),
        };

        Ok(LectureVector::new(
            LectureId::new(course, instructor),
            Vector::new(data),
            metadata,
        ))
    }
}

/// Parse a numeric list from a JSON array or a `"[0.2, 1, 0]"` string.
/// Every element must be a finite number.
fn parse_numbers(value: &Value) -> Option<Vec<f32>> {
    let owned;
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => {
            owned = serde_json::from_str::<Vec<Value>>(s.trim()).ok()?;
            &owned
        }
        _ => return None,
    };
    items
        .iter()
        .map(|v| v.as_f64().filter(|f| f.is_finite()).map(|f| f as f32))
        .collect()
}

/// Campus names in one-hot order, taken from the schema's campus block.
/// Schemas without one fall back to the general-education layout.
fn campus_names(schema: &FeatureSchema) -> Vec<String> {
    let lookup = |schema: &FeatureSchema| {
        schema.blocks.iter().find_map(|block| match (&block.field, &block.encoding) {
            (PreferenceField::Campus, Encoding::OneHot { categories }) => {
                Some(categories.iter().map(|c| c.value.clone()).collect::<Vec<_>>())
            }
            _ => None,
        })
    };
    lookup(schema)
        .or_else(|| lookup(&FeatureSchema::liberal()))
        .unwrap_or_default()
}

/// Decode a campus column. Plain names pass through; a one-hot literal
/// resolves to the name of its active slot.
fn decode_campus(value: &Value, schema: &FeatureSchema) -> Option<String> {
    let is_literal = match value {
        Value::Array(_) => true,
        Value::String(s) => s.trim_start().starts_with('['),
        _ => false,
    };
    if !is_literal {
        return match value {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            _ => None,
        };
    }

    let slots = parse_numbers(value)?;
    let active = slots.iter().position(|v| *v >= 0.5)?;
    campus_names(schema).into_iter().nth(active)
}

/// Precomputed lectures encoded with one schema
#[derive(Debug, Clone)]
pub struct CandidatePool {
    pub name: String,
    pub schema: FeatureSchema,
    pub lectures: Vec<LectureVector>,
    /// Rows rejected while loading
    pub dropped: usize,
}

impl CandidatePool {
    pub fn new(name: impl Into<String>, schema: FeatureSchema, lectures: Vec<LectureVector>) -> Self {
        Self {
            name: name.into(),
            schema,
            lectures,
            dropped: 0,
        }
    }

    /// Build a pool from raw JSON rows, dropping malformed ones
    pub fn from_rows(name: impl Into<String>, schema: FeatureSchema, rows: Vec<Value>) -> Self {
        let name = name.into();
        let mut lectures = Vec::with_capacity(rows.len());
        let mut dropped = 0;

        for (index, raw) in rows.into_iter().enumerate() {
            let lecture = serde_json::from_value::<LectureRow>(raw)
                .map_err(CoreError::from)
                .and_then(|row| row.into_lecture(&schema));
            match lecture {
                Ok(lecture) => lectures.push(lecture),
                Err(e) => {
                    dropped += 1;
                    warn!(pool = %name, row = index, "dropping lecture row: {}", e);
                }
            }
        }

        Self {
            name,
            schema,
            lectures,
            dropped,
        }
    }

    /// Load a pool from a JSON file holding an array of rows
    pub fn load_json<P: AsRef<Path>>(name: impl Into<String>, schema: FeatureSchema, path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let rows: Vec<Value> = serde_json::from_str(&content)?;
        let pool = Self::from_rows(name, schema, rows);
        info!(
            pool = %pool.name,
            schema = %pool.schema.id(),
            lectures = pool.lectures.len(),
            dropped = pool.dropped,
            "loaded candidate pool from {:?}",
            path
        );
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.lectures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lectures.is_empty()
    }
}

impl AsRef<CandidatePool> for CandidatePool {
    fn as_ref(&self) -> &CandidatePool {
        self
    }
}

/// Named pools shared across requests
///
/// Readers take a cheap `Arc` clone; reloading a pool swaps the entry
/// without disturbing requests already holding the old one.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<String, Arc<CandidatePool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pool, returning the previous one
    pub fn insert(&self, pool: CandidatePool) -> Option<Arc<CandidatePool>> {
        let name = pool.name.clone();
        self.pools.write().insert(name, Arc::new(pool))
    }

    pub fn get(&self, name: &str) -> Option<Arc<CandidatePool>> {
        self.pools.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Arc<CandidatePool>> {
        self.pools.write().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn liberal_vector() -> Vec<f32> {
        let mut v = vec![0.0; 20];
        v[1] = 1.0;
        v[17] = 1.0;
        v
    }

    #[test]
    fn test_row_with_korean_columns() {
        let row = json!({
            "과목명": "기초 통계학",
            "교수명": "원형묵",
            "영역": "자연의설명",
            "캠퍼스": "[0, 1]",
            "이수구분": "공통 교양",
            "학년": "1",
            "전체 벡터": format!("{:?}", liberal_vector())
        });
        let pool = CandidatePool::from_rows("liberal", FeatureSchema::liberal(), vec![row]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.dropped, 0);

        let lecture = &pool.lectures[0];
        assert_eq!(lecture.id, LectureId::new("기초 통계학", "원형묵"));
        assert_eq!(lecture.metadata.campus.as_deref(), Some("운정"));
        assert_eq!(lecture.metadata.completion.as_deref(), Some("공통교양"));
        assert_eq!(lecture.metadata.grade, Some(1));
        assert_eq!(lecture.vector.dim(), 20);
    }

    #[test]
    fn test_malformed_rows_are_dropped() {
        let rows = vec![
            json!({"course": "ok", "instructor": "a", "vector": liberal_vector()}),
            json!({"course": "short", "instructor": "b", "vector": [1.0, 0.0]}),
            json!({"course": "text", "instructor": "c", "vector": "[0.2, abc]"}),
            json!({"course": "nan", "instructor": "d", "vector": "[NaN, 1.0]"}),
            json!({"instructor": "e", "vector": liberal_vector()}),
            json!({"course": "no vector", "instructor": "f"}),
            json!({"course": "no instructor", "vector": "[1.0, 2"}),
            json!("not an object"),
        ];
        let pool = CandidatePool::from_rows("liberal", FeatureSchema::liberal(), rows);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.dropped, 7);
        assert_eq!(pool.lectures[0].id.course, "ok");
    }

    #[test]
    fn test_blank_instructor_rows_are_kept() {
        let rows = vec![
            json!({"과목명": "비판적 사고와 토론", "교수명": " ", "전체 벡터": liberal_vector()}),
            json!({"과목명": "글쓰기", "전체 벡터": format!("{:?}", liberal_vector())}),
            json!({"과목명": "글쓰기", "교수명": null, "전체 벡터": liberal_vector()}),
        ];
        let pool = CandidatePool::from_rows("liberal", FeatureSchema::liberal(), rows);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.dropped, 0);
        assert_eq!(pool.lectures[0].id, LectureId::new("비판적 사고와 토론", ""));
        assert_eq!(pool.lectures[1].id, LectureId::new("글쓰기", ""));
        assert_eq!(pool.lectures[1].id.identity_key(), pool.lectures[2].id.identity_key());
    }

    #[test]
    fn test_major_schema_length_enforced() {
        let mut major = vec![0.0; 18];
        major[0] = 3.0;
        let rows = vec![
            json!({"course": "자료구조", "instructor": "이", "vector": major}),
            json!({"course": "알고리즘", "instructor": "박", "vector": liberal_vector()}),
        ];
        let pool = CandidatePool::from_rows("major", FeatureSchema::major(), rows);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.lectures[0].id.course, "자료구조");
    }

    #[test]
    fn test_campus_decoding() {
        let schema = FeatureSchema::major();
        assert_eq!(decode_campus(&json!("[1, 0]"), &schema).as_deref(), Some("수정"));
        assert_eq!(decode_campus(&json!([0, 1]), &schema).as_deref(), Some("운정"));
        assert_eq!(decode_campus(&json!("수정"), &schema).as_deref(), Some("수정"));
        assert_eq!(decode_campus(&json!("[0, 0]"), &schema), None);
        assert_eq!(decode_campus(&json!(null), &schema), None);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let rows = json!([
            {"과목명": "글쓰기", "교수명": "한", "전체벡터": liberal_vector()},
            {"과목명": "broken", "교수명": "x", "전체벡터": "["}
        ]);
        write!(file, "{}", rows).unwrap();

        let pool = CandidatePool::load_json("liberal", FeatureSchema::liberal(), file.path()).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.dropped, 1);

        let missing = CandidatePool::load_json("liberal", FeatureSchema::liberal(), "/nonexistent/pool.json");
        assert!(missing.is_err());
    }

    #[test]
    fn test_registry_swap() {
        let registry = PoolRegistry::new();
        assert!(registry.is_empty());

        registry.insert(CandidatePool::new("career", FeatureSchema::liberal(), Vec::new()));
        let held = registry.get("career").unwrap();

        let previous = registry.insert(CandidatePool::from_rows(
            "career",
            FeatureSchema::liberal(),
            vec![json!({"course": "진로", "instructor": "김", "vector": liberal_vector()})],
        ));
        assert!(previous.is_some());

        // earlier readers keep their snapshot
        assert!(held.is_empty());
        assert_eq!(registry.get("career").unwrap().len(), 1);
        assert_eq!(registry.names(), vec!["career".to_string()]);
        assert!(registry.remove("career").is_some());
        assert!(registry.get("career").is_none());
    }
}
