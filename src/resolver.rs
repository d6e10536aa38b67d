//! Stateful conflict resolution.
//!
//! The resolver is the only component that carries state from one dilemma
//! to the next. A resolve cycle takes `&mut self` and runs to completion,
//! so the whole cycle is a single critical section: callers that share a
//! resolver across threads must serialize access (see
//! [`ScoringRuntime`](crate::runtime::ScoringRuntime)).

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::DecayConfig;
use crate::conflict::{ConflictPair, TraitConflict};
use crate::decay::{decay_factor, voted_decay};
use crate::score::ScoreMap;
use crate::taxonomy::TraitCode;

/// Multiplier applied to both scores of a conflicting pair.
pub const CONFLICT_PENALTY: f64 = 0.95;

/// Adjustment multiplier for the first trait of a pair.
pub const PROMOTE_FACTOR: f64 = 1.02;

/// Adjustment multiplier for the second trait of a pair.
pub const DEMOTE_FACTOR: f64 = 0.98;

/// Per-cycle momentum damping.
pub const MOMENTUM_DAMPING: f64 = 0.9;

/// Momentum lost per detected conflict.
pub const MOMENTUM_CONFLICT_COST: f64 = 0.05;

/// Decayed factors within this distance of 1.0 snap to exactly 1.0.
pub const SNAP_TOLERANCE: f64 = 0.01;

/// State persisted across resolve cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverState {
    /// Per-trait adjustment factors. Absent traits read as `1.0`.
    pub adjustment_factors: BTreeMap<TraitCode, f64>,
    /// Ethical momentum. Never negative.
    pub momentum: f64,
    /// Number of completed cycles.
    pub time_step: u64,
}

impl Default for ResolverState {
    fn default() -> Self {
        Self {
            adjustment_factors: BTreeMap::new(),
            momentum: 1.0,
            time_step: 0,
        }
    }
}

impl ResolverState {
    /// Returns the adjustment factor for `code` (`1.0` if never touched).
    #[must_use]
    pub fn adjustment_factor(&self, code: &TraitCode) -> f64 {
        self.adjustment_factors.get(code).copied().unwrap_or(1.0)
    }
}

/// Output of one resolve cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Adjusted scores.
    pub scores: ScoreMap,
    /// One entry per resolved pair, in detector order.
    pub conflicts: Vec<TraitConflict>,
}

/// Applies decay and pairwise adjustments, keeping [`ResolverState`].
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    state: ResolverState,
    decay: DecayConfig,
    rng: StdRng,
}

impl ConflictResolver {
    /// Creates a resolver whose fault injection is seeded from the OS.
    #[must_use]
    pub fn new(decay: DecayConfig) -> Self {
        Self::from_rng(decay, StdRng::from_entropy())
    }

    /// Creates a resolver with a reproducible fault-injection stream.
    #[must_use]
    pub fn with_seed(decay: DecayConfig, seed: u64) -> Self {
        Self::from_rng(decay, StdRng::seed_from_u64(seed))
    }

    /// Creates a resolver from an explicit generator.
    #[must_use]
    pub fn from_rng(decay: DecayConfig, rng: StdRng) -> Self {
        Self {
            state: ResolverState::default(),
            decay,
            rng,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Current momentum.
    #[must_use]
    pub const fn momentum(&self) -> f64 {
        self.state.momentum
    }

    /// Number of completed cycles.
    #[must_use]
    pub const fn time_step(&self) -> u64 {
        self.state.time_step
    }

    /// Adjustment factor for `code`.
    #[must_use]
    pub fn adjustment_factor(&self, code: &TraitCode) -> f64 {
        self.state.adjustment_factor(code)
    }

    /// Resets state to its construction values. The generator is kept.
    pub fn reset(&mut self) {
        self.state = ResolverState::default();
    }

    /// Runs one resolve cycle.
    ///
    /// `order` must be the trait order the pairs were detected against.
    #[allow(clippy::cast_precision_loss)]
    pub fn resolve(&mut self, order: &[TraitCode], pairs: &[ConflictPair], scores: &ScoreMap) -> Resolution {
        self.apply_temporal_decay();

        self.state.momentum =
            (self.state.momentum - MOMENTUM_CONFLICT_COST * pairs.len() as f64).max(0.0);

        let mut resolved = scores.clone();
        let mut conflicts = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let (Some(a), Some(b)) = (order.get(pair.first), order.get(pair.second)) else {
                tracing::error!(
                    first = pair.first,
                    second = pair.second,
                    "conflict pair outside trait order"
                );
                debug_assert!(false, "conflict pair outside trait order");
                continue;
            };
            if !resolved.contains(a) || !resolved.contains(b) {
                tracing::error!(trait_a = %a, trait_b = %b, "conflict names an unscored trait");
                debug_assert!(false, "conflict names an unscored trait");
                continue;
            }

            resolved.scale(a, CONFLICT_PENALTY);
            resolved.scale(b, CONFLICT_PENALTY);
            *self.state.adjustment_factors.entry(a.clone()).or_insert(1.0) *= PROMOTE_FACTOR;
            *self.state.adjustment_factors.entry(b.clone()).or_insert(1.0) *= DEMOTE_FACTOR;

            conflicts.push(TraitConflict {
                trait_a: a.clone(),
                trait_b: b.clone(),
                note: format!(
                    "interaction {:.2}, gap {}; both scores reduced by {:.0}%",
                    pair.interaction,
                    pair.gap,
                    (1.0 - CONFLICT_PENALTY) * 100.0
                ),
            });
        }

        tracing::debug!(
            time_step = self.state.time_step,
            momentum = self.state.momentum,
            conflicts = conflicts.len(),
            "resolve cycle complete"
        );

        Resolution {
            scores: resolved,
            conflicts,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn apply_temporal_decay(&mut self) {
        self.state.time_step += 1;
        let decay = voted_decay(
            self.state.time_step as f64,
            self.decay.fault_probability,
            &mut self.rng,
        );
        let factor = decay_factor(decay);

        for value in self.state.adjustment_factors.values_mut() {
            *value *= factor;
            if (*value - 1.0).abs() < SNAP_TOLERANCE {
                *value = 1.0;
            }
        }

        self.state.momentum = (self.state.momentum * MOMENTUM_DAMPING).max(0.0);
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(DecayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InteractionOverride, ResolutionConfig};
    use crate::conflict::detect_conflicts;
    use crate::interaction::InteractionMatrix;

    fn order(codes: &[&str]) -> Vec<TraitCode> {
        codes.iter().map(|c| TraitCode::new(*c).unwrap()).collect()
    }

    fn resolver() -> ConflictResolver {
        ConflictResolver::with_seed(DecayConfig { fault_probability: 0.0 }, 1)
    }

    fn re_es_pairs(order: &[TraitCode], scores: &ScoreMap) -> Vec<ConflictPair> {
        let m = InteractionMatrix::build(order, &[InteractionOverride::new("RE", "ES", -0.5)]);
        detect_conflicts(order, scores, &m, &ResolutionConfig::default())
    }

    #[test]
    fn fresh_state() {
        let r = resolver();
        assert_eq!(r.time_step(), 0);
        assert!((r.momentum() - 1.0).abs() < f64::EPSILON);
        assert!((r.adjustment_factor(&TraitCode::new("RE").unwrap()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn conflict_scenario_reduces_both_scores() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);
        assert_eq!(pairs.len(), 1);

        let mut r = resolver();
        let out = r.resolve(&order, &pairs, &scores);

        assert_eq!(out.scores.get(&order[0]), Some(950));
        assert_eq!(out.scores.get(&order[1]), Some(8550));
        assert_eq!(out.conflicts.len(), 1);
        assert_eq!(out.conflicts[0].trait_a, order[0]);
        assert_eq!(out.conflicts[0].trait_b, order[1]);
    }

    #[test]
    fn adjustment_factors_are_asymmetric() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut r = resolver();
        r.resolve(&order, &pairs, &scores);

        assert!((r.adjustment_factor(&order[0]) - 1.02).abs() < 1e-12);
        assert!((r.adjustment_factor(&order[1]) - 0.98).abs() < 1e-12);
    }

    #[test]
    fn cycle_without_conflicts_leaves_scores_untouched() {
        let order = order(&["A", "B"]);
        let scores: ScoreMap = order.iter().cloned().zip([5000, 5200]).collect();
        let mut r = resolver();
        let out = r.resolve(&order, &[], &scores);

        assert_eq!(out.scores, scores);
        assert!(out.conflicts.is_empty());
        assert_eq!(r.time_step(), 1);
        assert!((r.momentum() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn momentum_accounts_for_conflict_count() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut r = resolver();
        r.resolve(&order, &pairs, &scores);
        // 1.0 * 0.9 - 0.05
        assert!((r.momentum() - 0.85).abs() < 1e-12);
    }

    #[test]
    fn momentum_never_increases_and_floors_at_zero() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut r = resolver();
        let mut prev = r.momentum();
        for _ in 0..40 {
            r.resolve(&order, &pairs, &scores);
            assert!(r.momentum() <= prev);
            assert!(r.momentum() >= 0.0);
            prev = r.momentum();
        }
        assert!(r.momentum().abs() < f64::EPSILON);
    }

    #[test]
    fn factors_decay_on_next_cycle() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut r = resolver();
        r.resolve(&order, &pairs, &scores);
        // Cycle 2: decay value 18 -> factor 0.18.
        r.resolve(&order, &[], &scores);
        assert!((r.adjustment_factor(&order[0]) - 1.02 * 0.18).abs() < 1e-12);
        assert!((r.adjustment_factor(&order[1]) - 0.98 * 0.18).abs() < 1e-12);
    }

    #[test]
    fn factors_near_one_snap() {
        let mut r = resolver();
        let code = TraitCode::new("NC").unwrap();
        r.state.adjustment_factors.insert(code.clone(), 1.005);
        r.state.time_step = 99;
        // Cycle 100: decay value 100 -> factor 1.0, leaving 1.005 which snaps.
        r.resolve(&[], &[], &ScoreMap::new());
        assert!((r.adjustment_factor(&code) - 1.0).abs() < f64::EPSILON);
        assert_eq!(r.state().adjustment_factors.get(&code), Some(&1.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut r = resolver();
        r.resolve(&order, &pairs, &scores);
        r.reset();
        assert_eq!(r.state(), &ResolverState::default());
    }

    #[test]
    fn seeded_resolvers_agree() {
        let order = order(&["RE", "ES"]);
        let scores: ScoreMap = order.iter().cloned().zip([1000, 9000]).collect();
        let pairs = re_es_pairs(&order, &scores);

        let mut a = ConflictResolver::with_seed(DecayConfig { fault_probability: 0.3 }, 99);
        let mut b = ConflictResolver::with_seed(DecayConfig { fault_probability: 0.3 }, 99);
        for _ in 0..20 {
            assert_eq!(a.resolve(&order, &pairs, &scores), b.resolve(&order, &pairs, &scores));
            assert_eq!(a.state(), b.state());
        }
    }
}
