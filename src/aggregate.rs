//! Summary metrics over a score map.

use crate::score::{ScoreMap, SCORE_MAX};

/// Mean score normalized by [`SCORE_MAX`], in `[0.0, 1.0]`.
///
/// Returns `0.0` for an empty map.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mcda_score(scores: &ScoreMap) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    mean(scores) / SCORE_MAX as f64
}

/// Population standard deviation of the raw scores. Lower is more balanced.
///
/// Returns `0.0` for an empty map. Not normalized.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn balance_score(scores: &ScoreMap) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = mean(scores);
    let variance = scores
        .values()
        .map(|v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / scores.len() as f64;
    variance.sqrt()
}

#[allow(clippy::cast_precision_loss)]
fn mean(scores: &ScoreMap) -> f64 {
    scores.values().map(|v| v as f64).sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TraitCode;

    fn scores(values: &[i64]) -> ScoreMap {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (TraitCode::new(format!("T{i}")).unwrap(), *v))
            .collect()
    }

    #[test]
    fn empty_map_scores_zero() {
        assert!(mcda_score(&ScoreMap::new()).abs() < f64::EPSILON);
        assert!(balance_score(&ScoreMap::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn mcda_is_normalized_mean() {
        assert!((mcda_score(&scores(&[15_000, 15_000])) - 0.5).abs() < 1e-12);
        assert!((mcda_score(&scores(&[0, 30_000, 30_000])) - 2.0 / 3.0).abs() < 1e-12);
        assert!((mcda_score(&scores(&[30_000])) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn balance_is_population_std_dev() {
        assert!(balance_score(&scores(&[7000, 7000, 7000])).abs() < 1e-12);
        // values 2,4,4,4,5,5,7,9 have population std dev 2.
        let s = scores(&[2000, 4000, 4000, 4000, 5000, 5000, 7000, 9000]);
        assert!((balance_score(&s) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn single_score_is_perfectly_balanced() {
        assert!(balance_score(&scores(&[12_345])).abs() < f64::EPSILON);
    }
}
