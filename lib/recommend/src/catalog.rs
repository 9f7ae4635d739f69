//! Curriculum catalog: which lectures a student must be shown regardless
//! of preference.
//!
//! ```json
//! {
//!   "exempt_colleges": ["창의융합학부"],
//!   "rules": [
//!     {
//!       "pool": "liberal",
//!       "grades": [1],
//!       "majors": ["AI융합학부", "컴퓨터공학과"],
//!       "lectures": [{"과목명": "파이썬프로그래밍", "교수명": "장재경"}]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use sugang_schema::StudentProfile;
use tracing::info;
use crate::error::Result;
use crate::inject::RequiredLecture;

/// One group of required lectures and the students it applies to
///
/// Empty `grades` or `majors` lists match everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumRule {
    /// Pool (category) the lectures are injected into
    pub pool: String,

    #[serde(default)]
    pub grades: Vec<u8>,

    /// Matched against both major and sub-major
    #[serde(default)]
    pub majors: Vec<String>,

    #[serde(default)]
    pub excluded_majors: Vec<String>,

    #[serde(default)]
    pub excluded_colleges: Vec<String>,

    pub lectures: Vec<RequiredLecture>,
}

fn listed(list: &[String], value: Option<&str>) -> bool {
    value.is_some_and(|v| list.iter().any(|item| item.trim() == v.trim()))
}

impl CurriculumRule {
    pub fn applies_to(&self, profile: &StudentProfile) -> bool {
        if !self.grades.is_empty() && !profile.grade.is_some_and(|g| self.grades.contains(&g)) {
            return false;
        }
        let major = profile.major.as_deref();
        let sub_major = profile.sub_major.as_deref();
        if !self.majors.is_empty() && !listed(&self.majors, major) && !listed(&self.majors, sub_major) {
            return false;
        }
        if listed(&self.excluded_majors, major) || listed(&self.excluded_majors, sub_major) {
            return false;
        }
        !listed(&self.excluded_colleges, profile.college.as_deref())
    }
}

/// Required lectures by pool, grade and major group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumCatalog {
    /// Colleges whose students get no required lectures at all
    #[serde(default)]
    pub exempt_colleges: Vec<String>,

    #[serde(default)]
    pub rules: Vec<CurriculumRule>,
}

impl CurriculumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)?;
        info!(rules = catalog.rules.len(), "loaded curriculum catalog from {:?}", path);
        Ok(catalog)
    }

    pub fn is_exempt(&self, profile: &StudentProfile) -> bool {
        listed(&self.exempt_colleges, profile.college.as_deref())
    }

    /// Required lectures for `pool`, in rule order then lecture order
    pub fn required_for(&self, pool: &str, profile: &StudentProfile) -> Vec<RequiredLecture> {
        if self.is_exempt(profile) {
            return Vec::new();
        }
        self.rules
            .iter()
            .filter(|rule| rule.pool == pool && rule.applies_to(profile))
            .flat_map(|rule| rule.lectures.iter().cloned())
            .collect()
    }
}
