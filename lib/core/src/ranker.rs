//! Cosine similarity ranking of a candidate pool against one user vector.
//!
//! Pools hold tens to low hundreds of rows, so this is a plain linear scan
//! with no index structure.

use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use crate::error::{Error, Result};
use crate::lecture::LectureVector;
use crate::vector::Vector;

/// A candidate lecture paired with its cosine similarity to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub lecture: LectureVector,
    pub score: f32,
}

impl AsRef<LectureVector> for RankedCandidate {
    fn as_ref(&self) -> &LectureVector {
        &self.lecture
    }
}

/// Rank candidates by cosine similarity to `user`, best first
///
/// Both sides are L2-normalized independently; a zero vector scores 0.0.
/// Candidates with equal scores keep their input order.
///
/// # Errors
/// Returns [`Error::SchemaMismatch`] if any candidate vector length differs
/// from the user vector. Nothing is truncated or padded.
pub fn rank(user: &Vector, candidates: &[LectureVector]) -> Result<Vec<RankedCandidate>> {
    let user_unit = user.normalized();

    let mut ranked = Vec::with_capacity(candidates.len());
    for lecture in candidates {
        if lecture.vector.dim() != user.dim() {
            return Err(Error::SchemaMismatch {
                lecture: lecture.id.to_string(),
                expected: user.dim(),
                actual: lecture.vector.dim(),
            });
        }
        let score = user_unit.dot(&lecture.vector.normalized());
        ranked.push(RankedCandidate {
            lecture: lecture.clone(),
            score: if score.is_finite() { score.clamp(-1.0, 1.0) } else { 0.0 },
        });
    }

    // sort_by_key is stable, which gives first-seen-wins on ties
    ranked.sort_by_key(|c| Reverse(OrderedFloat(c.score)));

    tracing::debug!(
        candidates = candidates.len(),
        best = ranked.first().map(|c| c.score).unwrap_or(0.0),
        "ranked candidate pool"
    );

    Ok(ranked)
}
