//! Platform integrity gating.
//!
//! An [`IntegrityGuard`] is consulted once before the first dilemma is
//! processed. A failed check is reported as data, never as a panic.

use crate::error::IntegrityError;

/// Verifies that the platform can be trusted.
pub trait IntegrityGuard: Send {
    /// Name of the guard (for logging).
    fn name(&self) -> &str;

    /// Runs the check.
    ///
    /// # Errors
    /// Returns the reason the platform is untrusted.
    fn verify(&self) -> Result<(), IntegrityError>;
}

/// Guard for platforms without integrity hardware. Always passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustedPlatform;

impl IntegrityGuard for TrustedPlatform {
    fn name(&self) -> &str {
        "trusted_platform"
    }

    fn verify(&self) -> Result<(), IntegrityError> {
        Ok(())
    }
}

/// Guard with a fixed verdict, for tests and simulations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticGuard {
    verdict: Result<(), IntegrityError>,
}

impl StaticGuard {
    /// A guard that always passes.
    #[must_use]
    pub const fn passing() -> Self {
        Self { verdict: Ok(()) }
    }

    /// A guard that always fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            verdict: Err(IntegrityError::new(reason)),
        }
    }
}

impl IntegrityGuard for StaticGuard {
    fn name(&self) -> &str {
        "static"
    }

    fn verify(&self) -> Result<(), IntegrityError> {
        self.verdict.clone()
    }
}

/// Runs `guard` and logs the verdict.
///
/// # Errors
/// Propagates the guard's error.
pub fn verify_integrity(guard: &dyn IntegrityGuard) -> Result<(), IntegrityError> {
    match guard.verify() {
        Ok(()) => {
            tracing::info!(guard = guard.name(), "integrity verified");
            Ok(())
        }
        Err(err) => {
            tracing::error!(guard = guard.name(), reason = %err.reason, "integrity check failed");
            Err(err)
        }
    }
}
