//! # cocorels - Trait Scoring and Conflict Resolution
//!
//! cocorels scores a natural-language dilemma against a configurable
//! taxonomy of ethical traits, detects pairs of traits whose scores pull
//! against each other, and resolves those conflicts through a resolver
//! whose state (adjustment factors, momentum, time step) carries over from
//! one dilemma to the next.
//!
//! ## Core Concepts
//!
//! - **Taxonomy**: Ordered trait definitions (weight, category, anchor text)
//! - **ScoreMap**: Trait scores clamped to `[0, 30000]`, in taxonomy order
//! - **ConflictResolver**: Stateful resolver; one per scheduler
//! - **DilemmaScheduler**: FIFO queue that drives the scoring pipeline
//! - **ScoringRuntime**: Dedicated worker thread for multi-threaded callers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cocorels::{Context, DilemmaScheduler, EngineConfig, TaskType, Taxonomy};
//!
//! let taxonomy = Taxonomy::standard();
//! let mut scheduler = DilemmaScheduler::new(EngineConfig::default());
//! scheduler.enqueue("Should I report a colleague?", Context::new(), TaskType::Duty);
//!
//! let outcome = scheduler.process_next(&taxonomy).expect("queued");
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod dilemma;
pub mod error;
pub mod score;
pub mod taxonomy;

// Configuration
pub mod config;

// Pipeline stages
pub mod aggregate;
pub mod assessor;
pub mod boost;
pub mod conflict;
pub mod decay;
pub mod integrity;
pub mod interaction;
pub mod provenance;
pub mod resolver;

// Orchestration
pub mod processor;
pub mod report;
pub mod runtime;
pub mod scheduler;

// Re-export primary types at crate root for convenience
pub use aggregate::{balance_score, mcda_score};
pub use assessor::{assess_traits, DigestAssessor, TraitAssessor};
pub use config::{
    BoostConfig, CocorelsConfig, DecayConfig, EngineConfig, InteractionOverride, ResolutionConfig,
};
pub use conflict::{detect_conflicts, ConflictPair, TraitConflict};
pub use dilemma::{is_ethical_query, Context, Dilemma, DilemmaId, TaskType};
pub use error::{
    AssessmentError, CocorelsError, CocorelsResult, ConfigError, ExecutionError, IntegrityError,
    SigningError, ValidationError,
};
pub use integrity::{IntegrityGuard, StaticGuard, TrustedPlatform};
pub use interaction::InteractionMatrix;
pub use processor::EthicalProcessor;
pub use provenance::{DigestSigner, ProvenanceSigner};
pub use report::{DilemmaReport, ProcessingOutcome};
pub use resolver::{ConflictResolver, Resolution, ResolverState};
pub use runtime::{ReportHandle, ScoringRuntime, ScoringRuntimeConfig};
pub use scheduler::{process_ethical_dilemma, process_ethical_dilemma_with_guard, DilemmaScheduler};
pub use score::{ScoreMap, SCORE_MAX, SCORE_MIN};
pub use taxonomy::{Taxonomy, TraitCode, TraitDefinition, TraitEntry};
