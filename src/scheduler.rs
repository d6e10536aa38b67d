//! FIFO dilemma scheduler.
//!
//! The scheduler owns its queue and its single [`EthicalProcessor`]. It
//! processes exactly one dilemma per [`DilemmaScheduler::process_next`]
//! call, oldest first, and checks platform integrity once before the first
//! dilemma is processed.

use std::collections::VecDeque;
use std::path::Path;

use crate::config::{CocorelsConfig, EngineConfig};
use crate::dilemma::{Context, Dilemma, DilemmaId, TaskType};
use crate::error::IntegrityError;
use crate::integrity::{verify_integrity, IntegrityGuard, TrustedPlatform};
use crate::processor::EthicalProcessor;
use crate::report::ProcessingOutcome;
use crate::taxonomy::Taxonomy;

/// Queue of pending dilemmas plus the processor that drains it.
pub struct DilemmaScheduler {
    queue: VecDeque<Dilemma>,
    processor: EthicalProcessor,
    guard: Box<dyn IntegrityGuard>,
    integrity: Option<Result<(), IntegrityError>>,
}

impl DilemmaScheduler {
    /// Creates a scheduler with a default processor on a trusted platform.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_processor(EthicalProcessor::new(config))
    }

    /// Creates a scheduler around an existing processor.
    #[must_use]
    pub fn with_processor(processor: EthicalProcessor) -> Self {
        Self {
            queue: VecDeque::new(),
            processor,
            guard: Box::new(TrustedPlatform),
            integrity: None,
        }
    }

    /// Replaces the integrity guard. Clears any cached verdict.
    #[must_use]
    pub fn with_guard(mut self, guard: Box<dyn IntegrityGuard>) -> Self {
        self.guard = guard;
        self.integrity = None;
        self
    }

    /// Appends a new dilemma and returns its ID.
    pub fn enqueue(&mut self, query: impl Into<String>, context: Context, task_type: TaskType) -> DilemmaId {
        self.submit(Dilemma::new(query, context, task_type))
    }

    /// Appends an already-built dilemma.
    pub fn submit(&mut self, dilemma: Dilemma) -> DilemmaId {
        let id = dilemma.id;
        tracing::debug!(dilemma = %id, task_type = %dilemma.task_type, "dilemma queued");
        self.queue.push_back(dilemma);
        id
    }

    /// Removes a dilemma that has not started processing.
    ///
    /// Returns false if it is not queued (already processed or unknown).
    pub fn cancel(&mut self, id: DilemmaId) -> bool {
        let Some(pos) = self.queue.iter().position(|d| d.id == id) else {
            return false;
        };
        self.queue.remove(pos);
        tracing::debug!(dilemma = %id, "dilemma cancelled");
        true
    }

    /// Number of queued dilemmas.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The processor (and through it, resolver state).
    #[must_use]
    pub const fn processor(&self) -> &EthicalProcessor {
        &self.processor
    }

    /// Runs the integrity guard once and caches its verdict.
    ///
    /// # Errors
    /// The guard's error, on this and every later call.
    pub fn verify_integrity(&mut self) -> Result<(), IntegrityError> {
        if let Some(verdict) = &self.integrity {
            return verdict.clone();
        }
        let verdict = verify_integrity(self.guard.as_ref());
        self.integrity = Some(verdict.clone());
        verdict
    }

    /// Processes the oldest queued dilemma.
    ///
    /// Returns `None` when the queue is empty. When integrity verification
    /// fails the dilemma stays queued and a rejection is returned.
    pub fn process_next(&mut self, taxonomy: &Taxonomy) -> Option<ProcessingOutcome> {
        if self.queue.is_empty() {
            return None;
        }
        if let Err(err) = self.verify_integrity() {
            return Some(ProcessingOutcome::rejected(err.to_string()));
        }

        let dilemma = self.queue.pop_front()?;
        let report = self.processor.process(&dilemma, taxonomy);
        Some(report.into())
    }

    /// Processes every queued dilemma in order.
    ///
    /// Stops after the first rejection, since nothing more can be scored.
    pub fn process_all(&mut self, taxonomy: &Taxonomy) -> Vec<ProcessingOutcome> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(outcome) = self.process_next(taxonomy) {
            let rejected = !outcome.is_completed();
            outcomes.push(outcome);
            if rejected {
                break;
            }
        }
        outcomes
    }
}

impl Default for DilemmaScheduler {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for DilemmaScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DilemmaScheduler")
            .field("pending", &self.queue.len())
            .field("processor", &self.processor)
            .field("guard", &self.guard.name())
            .field("integrity", &self.integrity)
            .finish()
    }
}

/// One-shot entry point: verify integrity, load config, score one dilemma.
///
/// Integrity and configuration failures come back as
/// [`ProcessingOutcome::Rejected`].
pub fn process_ethical_dilemma(
    query: &str,
    context: Context,
    task_type: TaskType,
    config_path: Option<&Path>,
) -> ProcessingOutcome {
    process_ethical_dilemma_with_guard(query, context, task_type, config_path, Box::new(TrustedPlatform))
}

/// As [`process_ethical_dilemma`], with an explicit integrity guard.
pub fn process_ethical_dilemma_with_guard(
    query: &str,
    context: Context,
    task_type: TaskType,
    config_path: Option<&Path>,
    guard: Box<dyn IntegrityGuard>,
) -> ProcessingOutcome {
    if let Err(err) = verify_integrity(guard.as_ref()) {
        return ProcessingOutcome::rejected(err.to_string());
    }

    let config = match CocorelsConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "config rejected");
            return ProcessingOutcome::rejected(err.to_string());
        }
    };

    let mut scheduler = DilemmaScheduler::new(config.engine).with_guard(guard);
    // Already verified above.
    scheduler.integrity = Some(Ok(()));
    scheduler.enqueue(query, context, task_type);
    scheduler
        .process_next(&config.taxonomy)
        .unwrap_or_else(|| ProcessingOutcome::rejected("dilemma was not queued"))
}
