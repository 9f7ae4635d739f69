//! Raw student input: preference fields and profile fields.
//!
//! Both types deserialize from the same flat JSON object the client sends,
//! e.g. `{"전공": "AI융합학부", "학년": 1, "시험": "두 번", ...}`. Unknown
//! keys are ignored and malformed values degrade instead of failing.

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A declared preference field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceField {
    Exam,
    Assignment,
    GroupWork,
    Attendance,
    Grading,
    LectureTime,
    LectureQuality,
    ClassFormat,
    Campus,
    Rating,
}

impl PreferenceField {
    pub const ALL: [PreferenceField; 10] = [
        PreferenceField::Exam,
        PreferenceField::Assignment,
        PreferenceField::GroupWork,
        PreferenceField::Attendance,
        PreferenceField::Grading,
        PreferenceField::LectureTime,
        PreferenceField::LectureQuality,
        PreferenceField::ClassFormat,
        PreferenceField::Campus,
        PreferenceField::Rating,
    ];

    /// Key used by the client form
    pub fn key(&self) -> &'static str {
        match self {
            PreferenceField::Exam => "시험",
            PreferenceField::Assignment => "과제",
            PreferenceField::GroupWork => "조모임",
            PreferenceField::Attendance => "출결",
            PreferenceField::Grading => "성적",
            PreferenceField::LectureTime => "강의 시간",
            PreferenceField::LectureQuality => "강의력",
            PreferenceField::ClassFormat => "수업유형",
            PreferenceField::Campus => "캠퍼스",
            PreferenceField::Rating => "평점",
        }
    }

    /// Snake-case name, matching the serde representation
    pub fn name(&self) -> &'static str {
        match self {
            PreferenceField::Exam => "exam",
            PreferenceField::Assignment => "assignment",
            PreferenceField::GroupWork => "group_work",
            PreferenceField::Attendance => "attendance",
            PreferenceField::Grading => "grading",
            PreferenceField::LectureTime => "lecture_time",
            PreferenceField::LectureQuality => "lecture_quality",
            PreferenceField::ClassFormat => "class_format",
            PreferenceField::Campus => "campus",
            PreferenceField::Rating => "rating",
        }
    }

    /// Resolve a client key. Snake-case names are accepted too.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|f| f.key() == key || f.name() == key)
    }
}

/// Raw preference values for one recommendation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "BTreeMap<String, String>")]
pub struct UserPreference {
    values: AHashMap<PreferenceField, String>,
}

impl UserPreference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: PreferenceField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: PreferenceField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Render a JSON scalar as the raw string the encoders see
fn raw_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<Map<String, Value>> for UserPreference {
    fn from(map: Map<String, Value>) -> Self {
        let values = map
            .iter()
            .filter_map(|(key, value)| Some((PreferenceField::from_key(key)?, raw_text(value)?)))
            .collect();
        Self { values }
    }
}

impl From<UserPreference> for BTreeMap<String, String> {
    fn from(pref: UserPreference) -> Self {
        pref.values
            .into_iter()
            .map(|(field, value)| (field.key().to_string(), value))
            .collect()
    }
}

/// Profile fields used for pool scoping and curriculum lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, alias = "단과대학", skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, alias = "전공", skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, alias = "세부전공", deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub sub_major: Option<String>,
    /// Year of study; `None` when absent or unparseable
    #[serde(default, alias = "학년", deserialize_with = "lenient_grade", skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
}

impl StudentProfile {
    pub fn is_first_year(&self) -> bool {
        self.grade == Some(1)
    }
}

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_grade<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|g| u8::try_from(g).ok()),
        Value::String(s) => s.trim().trim_end_matches("학년").trim().parse().ok(),
        _ => None,
    })
}
