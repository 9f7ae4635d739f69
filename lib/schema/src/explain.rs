//! Explanations for similarity matches
//!
//! Works in the same vector space used for ranking: each dimension gets a
//! contribution score, the strongest dimensions are mapped back to labels
//! through [`FeatureSchema::label_for`].

use crate::schema::{ContributionScheme, FeatureSchema};
use smallvec::SmallVec;
use sugang_core::Vector;

/// Upper bound on labels per explanation
pub const MAX_LABELS: usize = 3;

/// Ordered explanation labels, at most [`MAX_LABELS`]
pub type Labels = SmallVec<[String; MAX_LABELS]>;

/// Per-dimension contribution of `lecture` to the match with `user`
///
/// One-hot dimensions score `u * l`; every other kind scores
/// `1 - |u - l|`. Only dimensions present in the schema and in both
/// vectors are scored.
pub fn contributions(user: &Vector, lecture: &Vector, schema: &FeatureSchema) -> Vec<f32> {
    user.as_slice()
        .iter()
        .zip(lecture.as_slice())
        .take(schema.dimension_count())
        .enumerate()
        .map(|(i, (u, l))| match schema.kind_at(i).map(|k| k.contribution()) {
            Some(ContributionScheme::Product) => u * l,
            Some(ContributionScheme::Agreement) => 1.0 - (u - l).abs(),
            None => 0.0,
        })
        .collect()
}

/// Up to three labels for the dimensions that contributed most
///
/// Dimensions are visited by contribution, highest first. On equal
/// contribution a categorical match outranks an agreement score, then the
/// lower index wins. Inactive dimensions and repeated label text are
/// skipped. Returns fewer than three labels when fewer exist.
pub fn explain(user: &Vector, lecture: &Vector, schema: &FeatureSchema) -> Labels {
    let scores = contributions(user, lecture, schema);
    let is_product = |i: usize| {
        schema.kind_at(i).map(|k| k.contribution()) == Some(ContributionScheme::Product)
    };

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .total_cmp(&scores[a])
            .then_with(|| is_product(b).cmp(&is_product(a)))
    });

    let mut labels = Labels::new();
    for index in order {
        let Some(value) = lecture.get(index) else { continue };
        if let Some(label) = schema.label_for(index, value) {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        if labels.len() == MAX_LABELS {
            break;
        }
    }
    labels
}
