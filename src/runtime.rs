//! Dedicated resolver worker.
//!
//! Resolver state must never see interleaved resolve cycles. When several
//! threads want to share one resolver, `ScoringRuntime` gives it a single
//! worker thread that owns the scheduler; callers submit dilemmas over a
//! bounded channel and wait on a per-dilemma reply handle.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::dilemma::{Context, Dilemma, DilemmaId, TaskType};
use crate::error::{CocorelsResult, ExecutionError};
use crate::processor::EthicalProcessor;
use crate::report::ProcessingOutcome;
use crate::resolver::ResolverState;
use crate::scheduler::DilemmaScheduler;
use crate::taxonomy::Taxonomy;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct ScoringRuntimeConfig {
    /// Maximum submitted-but-unstarted dilemmas.
    pub queue_capacity: usize,
}

impl Default for ScoringRuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

enum Job {
    Process {
        dilemma: Dilemma,
        reply: Sender<ProcessingOutcome>,
    },
    Snapshot {
        reply: Sender<ResolverState>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

/// Handle returned by [`ScoringRuntime::submit`].
pub struct ReportHandle {
    dilemma_id: DilemmaId,
    rx: Receiver<ProcessingOutcome>,
}

impl ReportHandle {
    /// The submitted dilemma's ID.
    #[must_use]
    pub const fn dilemma_id(&self) -> DilemmaId {
        self.dilemma_id
    }

    /// Waits for the outcome.
    ///
    /// # Errors
    /// `Disconnected` if the worker exited before replying.
    pub fn join(self) -> CocorelsResult<ProcessingOutcome> {
        Ok(self.rx.recv().map_err(|_| ExecutionError::Disconnected)?)
    }

    /// Waits for the outcome, at most `timeout`.
    ///
    /// Timing out does not cancel the dilemma; it will still be processed.
    ///
    /// # Errors
    /// `Timeout` or `Disconnected`.
    pub fn join_timeout(self, timeout: Duration) -> CocorelsResult<ProcessingOutcome> {
        self.rx.recv_timeout(timeout).map_err(|err| {
            match err {
                RecvTimeoutError::Timeout => ExecutionError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                RecvTimeoutError::Disconnected => ExecutionError::Disconnected,
            }
            .into()
        })
    }
}

/// Owns one scheduler on a dedicated thread.
pub struct ScoringRuntime {
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    queue_capacity: usize,
}

impl ScoringRuntime {
    /// Starts the worker.
    ///
    /// # Panics
    /// Panics if the OS refuses to spawn the worker thread.
    #[must_use]
    pub fn new(scheduler: DilemmaScheduler, taxonomy: Arc<Taxonomy>, config: ScoringRuntimeConfig) -> Self {
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let worker = thread::Builder::new()
            .name("cocorels-resolver".to_string())
            .spawn(move || run_worker(scheduler, &taxonomy, &rx))
            .expect("failed to spawn cocorels resolver worker");

        tracing::info!(queue_capacity, "scoring runtime started");
        Self {
            tx: Some(tx),
            worker: Some(worker),
            queue_capacity,
        }
    }

    /// Starts a runtime around a fresh processor.
    #[must_use]
    pub fn with_processor(processor: EthicalProcessor, taxonomy: Arc<Taxonomy>) -> Self {
        Self::new(
            DilemmaScheduler::with_processor(processor),
            taxonomy,
            ScoringRuntimeConfig::default(),
        )
    }

    /// Submits a dilemma without waiting for it.
    ///
    /// # Errors
    /// `QueueFull` when `queue_capacity` dilemmas are waiting,
    /// `Disconnected` if the worker is gone.
    pub fn submit(&self, dilemma: Dilemma) -> CocorelsResult<ReportHandle> {
        let dilemma_id = dilemma.id;
        let (reply, rx) = bounded::<ProcessingOutcome>(1);
        self.try_send(Job::Process { dilemma, reply })?;
        Ok(ReportHandle { dilemma_id, rx })
    }

    /// Builds and submits a dilemma.
    ///
    /// # Errors
    /// As [`Self::submit`].
    pub fn enqueue(
        &self,
        query: impl Into<String>,
        context: Context,
        task_type: TaskType,
    ) -> CocorelsResult<ReportHandle> {
        self.submit(Dilemma::new(query, context, task_type))
    }

    /// Submits and waits.
    ///
    /// # Errors
    /// As [`Self::submit`] and [`ReportHandle::join`].
    pub fn process(&self, dilemma: Dilemma) -> CocorelsResult<ProcessingOutcome> {
        self.submit(dilemma)?.join()
    }

    /// Snapshot of resolver state, taken between dilemmas.
    ///
    /// # Errors
    /// As [`Self::submit`].
    pub fn resolver_state(&self) -> CocorelsResult<ResolverState> {
        let (reply, rx) = bounded::<ResolverState>(1);
        self.try_send(Job::Snapshot { reply })?;
        Ok(rx.recv().map_err(|_| ExecutionError::Disconnected)?)
    }

    fn try_send(&self, job: Job) -> CocorelsResult<()> {
        let tx = self.tx.as_ref().ok_or(ExecutionError::Disconnected)?;
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ExecutionError::QueueFull {
                capacity: self.queue_capacity,
            }
            .into()),
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected.into()),
        }
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> CocorelsResult<Receiver<()>> {
        let (reply, rx) = bounded::<()>(1);
        self.try_send(Job::Sleep { duration, reply })?;
        Ok(rx)
    }
}

impl Drop for ScoringRuntime {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued jobs and exit.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        tracing::info!("scoring runtime stopped");
    }
}

fn run_worker(mut scheduler: DilemmaScheduler, taxonomy: &Taxonomy, rx: &Receiver<Job>) {
    while let Ok(job) = rx.recv() {
        match job {
            Job::Process { dilemma, reply } => {
                let id = scheduler.submit(dilemma);
                let outcome = scheduler
                    .process_next(taxonomy)
                    .unwrap_or_else(|| ProcessingOutcome::rejected("dilemma was not queued"));
                if !outcome.is_completed() {
                    // Rejected dilemmas stay queued in the scheduler; drop them here.
                    scheduler.cancel(id);
                }
                let _ = reply.send(outcome);
            }
            Job::Snapshot { reply } => {
                let _ = reply.send(scheduler.processor().resolver().state().clone());
            }

            #[cfg(test)]
            Job::Sleep { duration, reply } => {
                thread::sleep(duration);
                let _ = reply.send(());
            }
        }
    }
}
