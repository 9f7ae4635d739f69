//! Credit progress against the graduation requirement.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sugang_core::ExclusionSet;

/// Credits required to graduate
pub const GRADUATION_CREDITS: u32 = 130;

/// A course from the student's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedCourse {
    #[serde(alias = "과목명")]
    pub course: String,

    /// Completion category, e.g. `전공필수` or `공통교양`
    #[serde(default, alias = "이수구분", skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,

    #[serde(default, alias = "학점", deserialize_with = "lenient_credits")]
    pub credits: f32,
}

impl CompletedCourse {
    pub fn new(course: &str, completion: &str, credits: f32) -> Self {
        Self {
            course: course.to_string(),
            completion: Some(completion.to_string()),
            credits,
        }
    }
}

fn lenient_credits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let credits = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(credits.filter(|c| c.is_finite() && *c >= 0.0).unwrap_or(0.0) as f32)
}

/// Course names already taken, for exclusion
pub fn taken_courses(history: &[CompletedCourse]) -> ExclusionSet {
    history.iter().map(|c| c.course.as_str()).collect()
}

/// Credit category of a completion label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCategory {
    Major,
    Liberal,
    Teaching,
    Other,
}

impl CreditCategory {
    /// Classify a completion label by its category word
    pub fn classify(completion: Option<&str>) -> Self {
        match completion.map(str::trim) {
            Some(c) if c.contains("전공") => CreditCategory::Major,
            Some(c) if c.contains("교양") => CreditCategory::Liberal,
            Some(c) if c.contains("교직") => CreditCategory::Teaching,
            _ => CreditCategory::Other,
        }
    }
}

/// Earned credits per category, with percentages of [`GRADUATION_CREDITS`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreditSummary {
    pub required: u32,
    pub total: f32,
    pub major: f32,
    pub liberal: f32,
    pub teaching: f32,
    pub other: f32,
    pub major_percent: f32,
    pub liberal_percent: f32,
    pub teaching_percent: f32,
    pub total_percent: f32,
}

/// Percentage of the requirement, rounded to two decimals
fn percent(credits: f32) -> f32 {
    let value = f64::from(credits) / f64::from(GRADUATION_CREDITS) * 100.0;
    ((value * 100.0).round() / 100.0) as f32
}

pub fn summarize(history: &[CompletedCourse]) -> CreditSummary {
    let mut summary = CreditSummary {
        required: GRADUATION_CREDITS,
        ..Default::default()
    };
    for course in history {
        let slot = match CreditCategory::classify(course.completion.as_deref()) {
            CreditCategory::Major => &mut summary.major,
            CreditCategory::Liberal => &mut summary.liberal,
            CreditCategory::Teaching => &mut summary.teaching,
            CreditCategory::Other => &mut summary.other,
        };
        *slot += course.credits;
        summary.total += course.credits;
    }
    summary.major_percent = percent(summary.major);
    summary.liberal_percent = percent(summary.liberal);
    summary.teaching_percent = percent(summary.teaching);
    summary.total_percent = percent(summary.total);
    summary
}
