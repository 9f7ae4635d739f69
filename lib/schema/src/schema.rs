//! Feature schema definitions
//!
//! A schema is the single table both sides of the comparison are built
//! from: the ordered field blocks that make up a vector, how each raw
//! preference value is encoded, the post-hoc weight of each block, and how
//! an encoded value maps back to a label for explanations.

use serde::{Deserialize, Serialize};
use crate::preference::PreferenceField;

/// Tolerance for matching an encoded value against a bucket or state
pub const LABEL_TOLERANCE: f32 = 1e-4;

/// Feature schema for one family of candidate pools
///
/// Lecture vectors in a pool must have been produced with the same schema
/// name and version as the user vector they are ranked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSchema {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: u32,

    /// Field blocks in vector order
    pub blocks: Vec<FieldBlock>,
}

fn default_version() -> u32 {
    1
}

impl FeatureSchema {
    pub fn new(name: impl Into<String>, blocks: Vec<FieldBlock>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            blocks,
        }
    }

    /// `name@version`, used in logs and mismatch errors
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Total vector length
    pub fn dimension_count(&self) -> usize {
        self.blocks.iter().map(FieldBlock::width).sum()
    }

    /// Find the block owning `index` and the offset inside it
    pub fn locate(&self, index: usize) -> Option<(&FieldBlock, usize)> {
        let mut start = 0;
        for block in &self.blocks {
            let width = block.width();
            if index < start + width {
                return Some((block, index - start));
            }
            start += width;
        }
        None
    }

    /// Encoding kind of the dimension at `index`
    pub fn kind_at(&self, index: usize) -> Option<EncodingKind> {
        self.locate(index).map(|(block, _)| block.encoding.kind())
    }

    /// Human-readable label for an encoded value, if the dimension is active
    ///
    /// Pure in `(index, value)`. Returns `None` for an out-of-range index, an
    /// inactive one-hot slot, a zero scalar, or a value matching no declared
    /// bucket or state. Values are never snapped to a nearby bucket.
    pub fn label_for(&self, index: usize, value: f32) -> Option<&str> {
        let (block, offset) = self.locate(index)?;
        let unweighted = value / block.weight;

        match &block.encoding {
            Encoding::OneHot { categories } => {
                if value > 0.0 {
                    categories.get(offset).map(|c| c.label.as_str())
                } else {
                    None
                }
            }
            Encoding::OrdinalBucket { buckets, .. } => buckets
                .iter()
                .find(|b| approx_eq(b.value, unweighted))
                .map(|b| b.label.as_str()),
            Encoding::Boolean { neutral, labels, .. } => {
                if approx_eq(unweighted, 1.0) {
                    labels.on.as_deref()
                } else if approx_eq(unweighted, 0.0) {
                    labels.off.as_deref()
                } else if neutral.is_some_and(|n| approx_eq(unweighted, n)) {
                    labels.neutral.as_deref()
                } else {
                    None
                }
            }
            Encoding::WeightedScalar { bins, .. } => {
                if unweighted <= LABEL_TOLERANCE {
                    return None;
                }
                bins.iter()
                    .find(|b| unweighted <= b.upper + LABEL_TOLERANCE)
                    .map(|b| b.label.as_str())
            }
        }
    }

    /// Flat index table of the schema
    pub fn describe(&self) -> Vec<DimensionInfo> {
        let mut out = Vec::with_capacity(self.dimension_count());
        for block in &self.blocks {
            let kind = block.encoding.kind();
            match &block.encoding {
                Encoding::OneHot { categories } => {
                    for category in categories {
                        out.push(DimensionInfo {
                            index: out.len(),
                            name: format!("{}:{}", block.field.name(), category.value),
                            field: block.field,
                            kind,
                            weight: block.weight,
                        });
                    }
                }
                _ => out.push(DimensionInfo {
                    index: out.len(),
                    name: block.field.name().to_string(),
                    field: block.field,
                    kind,
                    weight: block.weight,
                }),
            }
        }
        out
    }

    /// Check the schema is usable for encoding and labelling
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.blocks.is_empty() {
            return Err(SchemaError::EmptySchema(self.name.clone()));
        }

        let mut seen = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if seen.contains(&block.field) {
                return Err(SchemaError::DuplicateField(block.field.name().to_string()));
            }
            seen.push(block.field);

            if !(block.weight.is_finite() && block.weight > 0.0) {
                return Err(SchemaError::NonPositiveWeight(block.field.name().to_string()));
            }

            let empty = match &block.encoding {
                Encoding::OneHot { categories } => categories.is_empty(),
                Encoding::OrdinalBucket { buckets, .. } => buckets.is_empty(),
                Encoding::Boolean { .. } => false,
                Encoding::WeightedScalar { steps, bins } => steps.is_empty() || bins.is_empty(),
            };
            if empty {
                return Err(SchemaError::EmptyBlock(block.field.name().to_string()));
            }
        }

        Ok(())
    }

    /// 18-dimension layout used by major (전공) pools
    pub fn major() -> Self {
        Self::new(
            "major",
            vec![
                blocks::class_format(),
                blocks::attendance(),
                blocks::exam(),
                blocks::load(PreferenceField::Assignment, "과제"),
                blocks::load(PreferenceField::GroupWork, "조모임"),
                blocks::grading(),
                blocks::lecture_time(),
                blocks::lecture_quality(),
                blocks::major_rating(),
            ],
        )
    }

    /// 20-dimension layout used by general-education (교양) and career pools
    pub fn liberal() -> Self {
        Self::new(
            "liberal",
            vec![
                blocks::exam(),
                blocks::load(PreferenceField::Assignment, "과제"),
                blocks::load(PreferenceField::GroupWork, "조모임"),
                blocks::attendance(),
                blocks::grading(),
                blocks::lecture_time(),
                blocks::lecture_quality(),
                blocks::class_format(),
                blocks::campus(),
                blocks::liberal_rating(),
            ],
        )
    }
}

/// One row of the schema's index table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DimensionInfo {
    pub index: usize,
    pub name: String,
    pub field: PreferenceField,
    pub kind: EncodingKind,
    pub weight: f32,
}

/// Builtin schema selector used in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Major,
    Liberal,
}

impl SchemaKind {
    pub fn schema(&self) -> FeatureSchema {
        match self {
            SchemaKind::Major => FeatureSchema::major(),
            SchemaKind::Liberal => FeatureSchema::liberal(),
        }
    }
}

impl std::str::FromStr for SchemaKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(SchemaKind::Major),
            "liberal" => Ok(SchemaKind::Liberal),
            other => Err(SchemaError::UnknownSchema(other.to_string())),
        }
    }
}

/// One preference field and the dimensions it occupies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldBlock {
    pub field: PreferenceField,

    /// Post-hoc multiplier applied to every dimension of the block
    #[serde(default = "default_weight")]
    pub weight: f32,

    pub encoding: Encoding,
}

fn default_weight() -> f32 {
    1.0
}

impl FieldBlock {
    pub fn new(field: PreferenceField, encoding: Encoding) -> Self {
        Self {
            field,
            weight: 1.0,
            encoding,
        }
    }

    pub fn weighted(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Number of dimensions the block occupies
    pub fn width(&self) -> usize {
        match &self.encoding {
            Encoding::OneHot { categories } => categories.len(),
            _ => 1,
        }
    }
}

/// Encoding kind of a dimension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    OneHot,
    OrdinalBucket,
    Boolean,
    WeightedScalar,
}

/// How a dimension contributes to an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionScheme {
    /// `user * lecture`: rewards a category both sides activate
    Product,
    /// `1 - |user - lecture|`: rewards close agreement, including both low
    Agreement,
}

impl EncodingKind {
    pub fn contribution(&self) -> ContributionScheme {
        match self {
            EncodingKind::OneHot => ContributionScheme::Product,
            _ => ContributionScheme::Agreement,
        }
    }
}

/// How raw text is compared with keywords
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Trimmed raw value equals the keyword
    #[default]
    Exact,
    /// Raw value contains the keyword
    Contains,
}

impl MatchMode {
    pub fn matches(&self, raw: &str, keyword: &str) -> bool {
        match self {
            MatchMode::Exact => raw.trim() == keyword,
            MatchMode::Contains => raw.contains(keyword),
        }
    }

    pub fn matches_any(&self, raw: &str, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.matches(raw, k))
    }
}

/// Field encoding rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoding {
    /// One dimension per category; exact match of the raw value
    OneHot { categories: Vec<Category> },

    /// Single dimension quantized to fixed buckets, first keyword match wins
    OrdinalBucket {
        #[serde(default)]
        mode: MatchMode,
        buckets: Vec<Bucket>,
        default: f32,
    },

    /// 1 for `on`, 0 for `off`; anything else is `neutral`, or 0 without one
    Boolean {
        #[serde(default)]
        mode: MatchMode,
        on: Vec<String>,
        #[serde(default)]
        off: Vec<String>,
        #[serde(default)]
        neutral: Option<f32>,
        #[serde(default)]
        labels: BooleanLabels,
    },

    /// Parsed number stepped into a sub-range, labelled by bins
    WeightedScalar { steps: Vec<ScalarStep>, bins: Vec<ScalarBin> },
}

impl Encoding {
    pub fn kind(&self) -> EncodingKind {
        match self {
            Encoding::OneHot { .. } => EncodingKind::OneHot,
            Encoding::OrdinalBucket { .. } => EncodingKind::OrdinalBucket,
            Encoding::Boolean { .. } => EncodingKind::Boolean,
            Encoding::WeightedScalar { .. } => EncodingKind::WeightedScalar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub value: String,
    pub label: String,
}

impl Category {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub keywords: Vec<String>,
    pub value: f32,
    pub label: String,
}

impl Bucket {
    pub fn new(keywords: &[&str], value: f32, label: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            value,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BooleanLabels {
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default)]
    pub off: Option<String>,
    #[serde(default)]
    pub neutral: Option<String>,
}

/// Raw values up to `max_raw` encode to `value`
///
/// The bound is inclusive unless `exclusive` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalarStep {
    pub max_raw: f64,
    pub value: f32,
    #[serde(default)]
    pub exclusive: bool,
}

impl ScalarStep {
    /// `raw <= max_raw`
    pub fn up_to(max_raw: f64, value: f32) -> Self {
        Self { max_raw, value, exclusive: false }
    }

    /// `raw < max_raw`
    pub fn below(max_raw: f64, value: f32) -> Self {
        Self { max_raw, value, exclusive: true }
    }

    pub fn admits(&self, raw: f64) -> bool {
        if self.exclusive {
            raw < self.max_raw
        } else {
            raw <= self.max_raw
        }
    }
}

/// Encoded values up to `upper` (inclusive) get `label`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalarBin {
    pub upper: f32,
    pub label: String,
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= LABEL_TOLERANCE
}

/// Field blocks shared by the builtin schemas
mod blocks {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    pub fn class_format() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::ClassFormat,
            Encoding::OneHot {
                categories: vec![
                    Category::new("블렌디드", "블렌디드"),
                    Category::new("원격", "원격"),
                    Category::new("일반", "일반"),
                ],
            },
        )
        .weighted(3.0)
    }

    pub fn attendance() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::Attendance,
            Encoding::OneHot {
                categories: vec![
                    Category::new("전자출결", "전자출결"),
                    Category::new("직접호명", "직접호명"),
                    Category::new("모름", "출결 모름"),
                    Category::new("복합적", "복합적 출결"),
                    Category::new("반영안함", "출결 반영안함"),
                ],
            },
        )
    }

    pub fn grading() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::Grading,
            Encoding::OneHot {
                categories: vec![
                    Category::new("너그러움", "성적 너그러움"),
                    Category::new("보통", "성적 보통"),
                    Category::new("모름", "성적 모름"),
                    Category::new("깐깐함", "성적 깐깐함"),
                ],
            },
        )
    }

    pub fn campus() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::Campus,
            Encoding::OneHot {
                categories: vec![
                    Category::new("수정", "수정캠퍼스"),
                    Category::new("운정", "운정캠퍼스"),
                ],
            },
        )
    }

    pub fn exam() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::Exam,
            Encoding::OrdinalBucket {
                mode: MatchMode::Contains,
                buckets: vec![
                    Bucket::new(&["없"], 0.2, "시험 없음"),
                    Bucket::new(&["한"], 0.4, "시험 1번"),
                    Bucket::new(&["두"], 0.6, "시험 2번"),
                    Bucket::new(&["세"], 0.8, "시험 3번"),
                    Bucket::new(&["네", "4"], 1.0, "시험 4번 이상"),
                ],
                default: 0.4,
            },
        )
        .weighted(1.0 / 3.0)
    }

    /// Ternary load scale: heavy 1, absent 0, otherwise 0.5
    pub fn load(field: PreferenceField, noun: &str) -> FieldBlock {
        FieldBlock::new(
            field,
            Encoding::Boolean {
                mode: MatchMode::Contains,
                on: strings(&["많", "있"]),
                off: strings(&["없"]),
                neutral: Some(0.5),
                labels: BooleanLabels {
                    on: Some(format!("{} 많음", noun)),
                    off: Some(format!("{} 없음", noun)),
                    neutral: Some(format!("{} 보통/모름", noun)),
                },
            },
        )
    }

    pub fn lecture_time() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::LectureTime,
            Encoding::Boolean {
                mode: MatchMode::Exact,
                on: strings(&["풀강"]),
                off: Vec::new(),
                neutral: None,
                labels: BooleanLabels {
                    on: Some("풀강".to_string()),
                    off: Some("풀강X".to_string()),
                    neutral: None,
                },
            },
        )
    }

    pub fn lecture_quality() -> FieldBlock {
        FieldBlock::new(
            PreferenceField::LectureQuality,
            Encoding::OrdinalBucket {
                mode: MatchMode::Contains,
                buckets: vec![
                    Bucket::new(&["좋"], 1.0, "강의력 좋음"),
                    Bucket::new(&["보통"], 0.5, "강의력 보통/모름"),
                    Bucket::new(&["나쁨", "나쁘"], 0.0, "강의력 나쁨"),
                ],
                default: 0.5,
            },
        )
    }

    /// Course rating stepped into [0.1, 0.5]; unparseable input encodes to 0
    pub fn rating(weight: f32, steps: Vec<ScalarStep>, bins: Vec<ScalarBin>) -> FieldBlock {
        FieldBlock::new(PreferenceField::Rating, Encoding::WeightedScalar { steps, bins }).weighted(weight)
    }

    fn bin(upper: f32, label: &str) -> ScalarBin {
        ScalarBin { upper, label: label.to_string() }
    }

    /// General education: closed upper bounds, anything above 4 is 0.5
    pub fn liberal_rating() -> FieldBlock {
        rating(
            1.0,
            vec![
                ScalarStep::up_to(1.0, 0.1),
                ScalarStep::up_to(2.0, 0.2),
                ScalarStep::up_to(3.0, 0.3),
                ScalarStep::up_to(4.0, 0.4),
                ScalarStep::up_to(f64::MAX, 0.5),
            ],
            vec![
                bin(0.1, "평점 ≤ 1"),
                bin(0.2, "평점 ≤ 2"),
                bin(0.3, "평점 ≤ 3"),
                bin(0.4, "평점 ≤ 4"),
                bin(0.5, "평점 ≤ 5"),
            ],
        )
    }

    /// Major: half-open ranges `[1, 2)` .. `[4, 5]`, below 1 or above 5
    /// encodes to 0, then halved
    pub fn major_rating() -> FieldBlock {
        rating(
            0.5,
            vec![
                ScalarStep::below(1.0, 0.0),
                ScalarStep::below(2.0, 0.2),
                ScalarStep::below(3.0, 0.3),
                ScalarStep::below(4.0, 0.4),
                ScalarStep::up_to(5.0, 0.5),
            ],
            vec![
                bin(0.2, "평점 1~2"),
                bin(0.3, "평점 2~3"),
                bin(0.4, "평점 3~4"),
                bin(0.5, "평점 4~5"),
            ],
        )
    }
}

/// Errors that can occur during schema validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema '{0}' has no field blocks")]
    EmptySchema(String),

    #[error("Field '{0}' appears more than once")]
    DuplicateField(String),

    #[error("Field '{0}' must have a positive weight")]
    NonPositiveWeight(String),

    #[error("Field '{0}' declares no categories, buckets or bins")]
    EmptyBlock(String),

    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),
}
