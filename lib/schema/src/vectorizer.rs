//! Preference Vectorizer
//!
//! Converts a raw preference record into a vector laid out by a
//! [`FeatureSchema`]. Encoding never fails: a missing or unrecognised value
//! degrades to the neutral or zero contribution of its block.

use crate::preference::UserPreference;
use crate::schema::{Encoding, FeatureSchema, FieldBlock, MatchMode, ScalarStep};
use sugang_core::Vector;

/// Encode `preference` with `schema`
///
/// The result has exactly `schema.dimension_count()` components. Pairing it
/// with a pool built from the same schema is the caller's responsibility;
/// ranking rejects a length mismatch.
pub fn vectorize(preference: &UserPreference, schema: &FeatureSchema) -> Vector {
    Vectorizer::new(schema.clone()).vectorize(preference)
}

/// Schema-bound vectorizer
#[derive(Debug, Clone)]
pub struct Vectorizer {
    schema: FeatureSchema,
}

impl Vectorizer {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    /// Get a reference to the schema
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn dimension_count(&self) -> usize {
        self.schema.dimension_count()
    }

    /// Convert a preference record to a vector
    ///
    /// Blocks are processed in schema order, each encoded from its own field
    /// and then scaled by the block weight. Field order in the input has no
    /// effect.
    pub fn vectorize(&self, preference: &UserPreference) -> Vector {
        let mut components: Vec<f32> = Vec::with_capacity(self.dimension_count());

        for block in &self.schema.blocks {
            let raw = preference.get(block.field);
            let encoded = self.embed_block(block, raw);
            components.extend(encoded.into_iter().map(|v| v * block.weight));
        }

        Vector::new(components)
    }

    fn embed_block(&self, block: &FieldBlock, raw: Option<&str>) -> Vec<f32> {
        match &block.encoding {
            Encoding::OneHot { categories } => {
                let raw = raw.map(str::trim);
                categories
                    .iter()
                    .map(|c| if raw == Some(c.value.as_str()) { 1.0 } else { 0.0 })
                    .collect()
            }
            Encoding::OrdinalBucket { mode, buckets, default } => {
                let value = raw
                    .and_then(|raw| buckets.iter().find(|b| mode.matches_any(raw, &b.keywords)))
                    .map(|b| b.value)
                    .unwrap_or(*default);
                vec![value]
            }
            Encoding::Boolean { mode, on, off, neutral, .. } => {
                vec![Self::embed_boolean(*mode, on, off, *neutral, raw)]
            }
            Encoding::WeightedScalar { steps, .. } => {
                vec![Self::embed_scalar(steps, raw)]
            }
        }
    }

    fn embed_boolean(mode: MatchMode, on: &[String], off: &[String], neutral: Option<f32>, raw: Option<&str>) -> f32 {
        match raw {
            Some(raw) if mode.matches_any(raw, on) => 1.0,
            Some(raw) if mode.matches_any(raw, off) => 0.0,
            _ => neutral.unwrap_or(0.0),
        }
    }

    /// Parse and step a numeric field; unparseable or non-finite input is 0
    fn embed_scalar(steps: &[ScalarStep], raw: Option<&str>) -> f32 {
        let parsed = raw.and_then(|r| r.trim().parse::<f64>().ok()).filter(|v| v.is_finite());
        match parsed {
            Some(score) => steps
                .iter()
                .find(|s| s.admits(score))
                .map(|s| s.value)
                .unwrap_or(0.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::PreferenceField;

    fn sample_preference() -> UserPreference {
        UserPreference::new()
            .with(PreferenceField::Exam, "두 번")
            .with(PreferenceField::Assignment, "있음")
            .with(PreferenceField::GroupWork, "없음")
            .with(PreferenceField::Attendance, "전자출결")
            .with(PreferenceField::Grading, "보통")
            .with(PreferenceField::LectureTime, "풀강")
            .with(PreferenceField::LectureQuality, "좋음")
            .with(PreferenceField::ClassFormat, "블렌디드")
            .with(PreferenceField::Campus, "수정")
            .with(PreferenceField::Rating, "4.3")
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-6, "dimension {}: {} != {}", i, a, e);
        }
    }

    #[test]
    fn test_liberal_layout() {
        let vector = vectorize(&sample_preference(), &FeatureSchema::liberal());
        assert_close(
            vector.as_slice(),
            &[
                0.2, // exam 0.6 / 3
                1.0, 0.0, // assignment, group work
                1.0, 0.0, 0.0, 0.0, 0.0, // attendance
                0.0, 1.0, 0.0, 0.0, // grading
                1.0, 1.0, // lecture time, quality
                3.0, 0.0, 0.0, // class format x3
                1.0, 0.0, // campus
                0.5, // rating
            ],
        );
    }

    #[test]
    fn test_major_layout() {
        let vector = vectorize(&sample_preference(), &FeatureSchema::major());
        assert_eq!(vector.dim(), 18);
        assert_close(&vector.as_slice()[0..3], &[3.0, 0.0, 0.0]);
        assert!((vector.as_slice()[8] - 0.2).abs() < 1e-6);
        // rating halved
        assert!((vector.as_slice()[17] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_empty_preference_degrades_to_neutral() {
        let vector = vectorize(&UserPreference::new(), &FeatureSchema::liberal());
        assert_eq!(vector.dim(), 20);
        let v = vector.as_slice();
        assert!((v[0] - 0.4 / 3.0).abs() < 1e-6); // default exam bucket
        assert_eq!(v[1], 0.5); // unknown load
        assert_eq!(v[2], 0.5);
        assert_eq!(v[12], 0.0); // not full-length
        assert_eq!(v[13], 0.5); // quality default
        assert!(v[3..12].iter().all(|x| *x == 0.0));
        assert!(v[14..20].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_unknown_enum_value_zero_block() {
        let pref = UserPreference::new()
            .with(PreferenceField::ClassFormat, "대면")
            .with(PreferenceField::Campus, "상관없음");
        let v = vectorize(&pref, &FeatureSchema::liberal());
        assert!(v.as_slice()[14..19].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_exam_keyword_buckets() {
        let schema = FeatureSchema::liberal();
        let cases = [("없음", 0.2), ("한 번", 0.4), ("세 번", 0.8), ("네 번 이상", 1.0), ("4회", 1.0), ("모름", 0.4)];
        for (raw, expected) in cases {
            let v = vectorize(&UserPreference::new().with(PreferenceField::Exam, raw), &schema);
            assert!((v.as_slice()[0] * 3.0 - expected).abs() < 1e-5, "{} -> {}", raw, v.as_slice()[0]);
        }
    }

    #[test]
    fn test_rating_parse_failure_is_zero() {
        let schema = FeatureSchema::liberal();
        for raw in ["", "abc", "NaN", "inf"] {
            let v = vectorize(&UserPreference::new().with(PreferenceField::Rating, raw), &schema);
            assert_eq!(v.as_slice()[19], 0.0, "rating {:?}", raw);
        }
        let v = vectorize(&UserPreference::new().with(PreferenceField::Rating, " 2.5 "), &schema);
        assert!((v.as_slice()[19] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_major_rating_half_open_steps() {
        let schema = FeatureSchema::major();
        let cases = [("0.5", 0.0), ("1.0", 0.1), ("1.9", 0.1), ("2.0", 0.15), ("3.0", 0.2), ("4.0", 0.25), ("5.0", 0.25), ("5.5", 0.0)];
        for (raw, expected) in cases {
            let v = vectorize(&UserPreference::new().with(PreferenceField::Rating, raw), &schema);
            assert!((v.as_slice()[17] - expected).abs() < 1e-6, "rating {} -> {}", raw, v.as_slice()[17]);
        }
    }

    #[test]
    fn test_liberal_rating_closed_steps() {
        let schema = FeatureSchema::liberal();
        let cases = [("0.5", 0.1), ("1.0", 0.1), ("2.0", 0.2), ("4.0", 0.4), ("4.1", 0.5), ("9", 0.5)];
        for (raw, expected) in cases {
            let v = vectorize(&UserPreference::new().with(PreferenceField::Rating, raw), &schema);
            assert!((v.as_slice()[19] - expected).abs() < 1e-6, "rating {} -> {}", raw, v.as_slice()[19]);
        }
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let schema = FeatureSchema::liberal();
        let vectorizer = Vectorizer::new(schema.clone());
        let pref = sample_preference();
        assert_eq!(vectorizer.vectorize(&pref), vectorizer.vectorize(&pref));
        assert_eq!(vectorizer.vectorize(&pref), vectorize(&pref, &schema));
    }
}
