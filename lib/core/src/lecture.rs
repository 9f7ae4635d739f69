use serde::{Deserialize, Serialize};
use crate::vector::Vector;

/// Normalize a course name into an exclusion key (trimmed, lowercased)
pub fn course_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Identity of a lecture offering
///
/// A course name alone is not unique: several instructors (and sections)
/// may teach the same course. The pair is the deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LectureId {
    pub course: String,
    pub instructor: String,
}

impl LectureId {
    pub fn new(course: impl Into<String>, instructor: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            instructor: instructor.into(),
        }
    }

    /// Exclusion key of the course name
    pub fn course_key(&self) -> String {
        course_key(&self.course)
    }

    /// Identity key used for list deduplication. Both parts are trimmed so
    /// that a stray space in scraped data does not split one offering in two.
    pub fn identity_key(&self) -> (String, String) {
        (course_key(&self.course), self.instructor.trim().to_string())
    }
}

impl std::fmt::Display for LectureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.course, self.instructor)
    }
}

/// Display and scoping metadata carried through unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LectureMetadata {
    /// Curriculum area, e.g. `SW문해` or `1영역`
    #[serde(default, alias = "영역", skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, alias = "캠퍼스", skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(default, alias = "시간표", skip_serializing_if = "Option::is_none")]
    pub timetable: Option<String>,
    #[serde(default, alias = "개설학과전공", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Completion category, e.g. `공통교양`
    #[serde(default, alias = "이수구분", skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(default, alias = "학년", skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
}

/// A candidate lecture with its precomputed feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureVector {
    pub id: LectureId,
    pub vector: Vector,
    #[serde(default)]
    pub metadata: LectureMetadata,
}

impl LectureVector {
    pub fn new(id: LectureId, vector: Vector, metadata: LectureMetadata) -> Self {
        Self { id, vector, metadata }
    }

    /// Look up a scoping field by name. `grade` is rendered as text.
    pub fn field(&self, name: &str) -> Option<String> {
        let meta = &self.metadata;
        match name {
            "course" => Some(self.id.course.clone()),
            "instructor" => Some(self.id.instructor.clone()),
            "area" => meta.area.clone(),
            "campus" => meta.campus.clone(),
            "timetable" => meta.timetable.clone(),
            "department" => meta.department.clone(),
            "completion" => meta.completion.clone(),
            "grade" => meta.grade.map(|g| g.to_string()),
            _ => None,
        }
    }
}
