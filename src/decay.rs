//! Temporal decay with triple-redundant voting.
//!
//! The decay value is computed by three replicas and settled by majority
//! vote, tolerating a single upset replica. Upsets are simulated by halving
//! the second replica with a configurable probability drawn from a
//! caller-supplied generator, so a vote is reproducible under a fixed seed.

use rand::Rng;

/// Decay rate applied to the time step.
pub const DECAY_RATE: f64 = 0.1;

/// Computes `round(100 * (1 - e^(-0.1 * factor)))`, clamped into `[0, 100]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_decay(factor: f64) -> u8 {
    let value = (100.0 * (1.0 - (-DECAY_RATE * factor).exp())).round();
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0) as u8
}

/// Settles three replica values.
///
/// `r1` wins when it agrees with either other replica; otherwise `r2` wins
/// when it agrees with `r3`; with no majority `r1` is returned.
#[must_use]
pub const fn majority_vote(r1: u8, r2: u8, r3: u8) -> u8 {
    if r1 == r2 || r1 == r3 {
        r1
    } else if r2 == r3 {
        r2
    } else {
        r1
    }
}

/// Computes the decay value three times and votes.
///
/// Exactly one draw is taken from `rng` per call.
pub fn voted_decay<R: Rng + ?Sized>(factor: f64, fault_probability: f64, rng: &mut R) -> u8 {
    let r1 = compute_decay(factor);
    let mut r2 = compute_decay(factor);
    let r3 = compute_decay(factor);

    if rng.gen::<f64>() < fault_probability {
        r2 /= 2;
        tracing::debug!(factor, upset = r2, "decay replica upset");
    }

    majority_vote(r1, r2, r3)
}

/// Converts a decay value into a multiplier in `[0.0, 1.0]`.
#[must_use]
pub fn decay_factor(decay: u8) -> f64 {
    (f64::from(decay) / 100.0).clamp(0.0, 1.0)
}
