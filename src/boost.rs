//! Multiplicative score boosts.
//!
//! Boosts are pure: they take a score map and return a new one. Each
//! multiply is followed immediately by a clamp. Reapplying a boost
//! compounds, so the processor applies each one at most once per dilemma.

use crate::config::BoostConfig;
use crate::score::ScoreMap;
use crate::taxonomy::{Taxonomy, TraitCode};

/// Boosts every trait whose category matches `config.duty_category`.
///
/// Traits without a taxonomy entry are left unchanged.
#[must_use]
pub fn apply_duty_boost(scores: &ScoreMap, taxonomy: &Taxonomy, config: &BoostConfig) -> ScoreMap {
    let mut boosted = scores.clone();
    for (code, def) in taxonomy.iter() {
        if def.category == config.duty_category {
            boosted.scale(code, config.duty_factor);
        }
    }
    boosted
}

/// Boosts the configured core traits.
///
/// Core codes that are not valid trait codes or have no score are skipped.
#[must_use]
pub fn apply_core_boost(scores: &ScoreMap, config: &BoostConfig) -> ScoreMap {
    let mut boosted = scores.clone();
    for raw in &config.core_traits {
        if let Ok(code) = TraitCode::new(raw.as_str()) {
            boosted.scale(&code, config.core_factor);
        }
    }
    boosted
}
