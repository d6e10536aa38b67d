//! Conflict detection between trait scores.
//!
//! A conflict is an explicit record, not an error. The detector flags a
//! directed pair `(i, j)` when the traits interact poorly
//! (`M[i][j] < conflict_threshold`) and their scores are far apart
//! (`|s_i - s_j| > score_diff_threshold`). Because the interaction matrix
//! may be asymmetric, `(i, j)` and `(j, i)` are evaluated independently and
//! both may be reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ResolutionConfig;
use crate::interaction::InteractionMatrix;
use crate::score::{ScoreMap, NEUTRAL_SCORE};
use crate::taxonomy::TraitCode;

/// A flagged directed pair, by position in the trait order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictPair {
    /// Row index (`trait_a`).
    pub first: usize,
    /// Column index (`trait_b`).
    pub second: usize,
    /// Interaction weight `M[first][second]`.
    pub interaction: f64,
    /// Absolute score gap.
    pub gap: i64,
}

/// A resolved conflict as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitConflict {
    /// First trait of the pair (adjustment factor raised).
    pub trait_a: TraitCode,
    /// Second trait of the pair (adjustment factor lowered).
    pub trait_b: TraitCode,
    /// Human-readable description.
    pub note: String,
}

impl fmt::Display for TraitConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}: {}", self.trait_a, self.trait_b, self.note)
    }
}

/// Flags conflicting pairs.
///
/// Output is in row-major order (`i`, then `j`). The diagonal can never
/// conflict since its gap is zero. A trait without a score reads as
/// [`NEUTRAL_SCORE`].
///
/// # Panics
/// Panics if `matrix` was built for a different number of traits.
#[must_use]
pub fn detect_conflicts(
    order: &[TraitCode],
    scores: &ScoreMap,
    matrix: &InteractionMatrix,
    config: &ResolutionConfig,
) -> Vec<ConflictPair> {
    assert_eq!(
        matrix.size(),
        order.len(),
        "interaction matrix does not match trait order"
    );

    let values: Vec<i64> = order
        .iter()
        .map(|code| scores.get(code).unwrap_or(NEUTRAL_SCORE))
        .collect();

    let mut pairs = Vec::new();
    for (i, &si) in values.iter().enumerate() {
        for (j, &sj) in values.iter().enumerate() {
            let interaction = matrix.get(i, j);
            let gap = (si - sj).abs();
            if interaction < config.conflict_threshold && gap > config.score_diff_threshold {
                pairs.push(ConflictPair {
                    first: i,
                    second: j,
                    interaction,
                    gap,
                });
            }
        }
    }

    if !pairs.is_empty() {
        tracing::debug!(count = pairs.len(), "conflicts detected");
    }
    pairs
}
