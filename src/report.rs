//! Per-dilemma output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict::TraitConflict;
use crate::dilemma::{DilemmaId, TaskType};
use crate::score::ScoreMap;

/// Scores, conflicts and summary metrics for one processed dilemma.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilemmaReport {
    /// The dilemma this report belongs to.
    pub dilemma_id: DilemmaId,
    /// Kind of dilemma processed.
    pub task_type: TaskType,
    /// Provenance signature; empty when signing failed.
    pub signature: String,
    /// Final scores, in taxonomy order.
    pub scores: ScoreMap,
    /// Resolved conflicts, in detection order.
    pub conflicts: Vec<TraitConflict>,
    /// Normalized mean score in `[0, 1]`.
    pub mcda_score: f64,
    /// Population standard deviation of the final scores.
    pub balance_score: f64,
    /// Resolver momentum after this dilemma.
    pub momentum: f64,
    /// Always true on a completed report.
    pub hardware_compatible: bool,
    /// When processing finished.
    pub processed_at: DateTime<Utc>,
}

impl DilemmaReport {
    /// Returns true if any conflict was resolved.
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Result of asking the scheduler to process a dilemma.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingOutcome {
    /// The dilemma was scored.
    Completed(Box<DilemmaReport>),
    /// Integrity or configuration failure; nothing was scored.
    Rejected {
        /// Human-readable cause.
        error: String,
        /// Always false.
        hardware_compatible: bool,
    },
}

impl ProcessingOutcome {
    /// Builds a rejection.
    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self::Rejected {
            error: error.into(),
            hardware_compatible: false,
        }
    }

    /// Returns the report if the dilemma was scored.
    #[must_use]
    pub fn report(&self) -> Option<&DilemmaReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Rejected { .. } => None,
        }
    }

    /// Consumes the outcome, returning the report if any.
    #[must_use]
    pub fn into_report(self) -> Option<DilemmaReport> {
        match self {
            Self::Completed(report) => Some(*report),
            Self::Rejected { .. } => None,
        }
    }

    /// Returns the rejection cause, if rejected.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected { error, .. } => Some(error),
        }
    }

    /// Returns true if the dilemma was scored.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether the platform was trusted for this outcome.
    #[must_use]
    pub fn hardware_compatible(&self) -> bool {
        match self {
            Self::Completed(report) => report.hardware_compatible,
            Self::Rejected {
                hardware_compatible,
                ..
            } => *hardware_compatible,
        }
    }
}

impl From<DilemmaReport> for ProcessingOutcome {
    fn from(report: DilemmaReport) -> Self {
        Self::Completed(Box::new(report))
    }
}
