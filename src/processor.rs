//! Single-dilemma pipeline.
//!
//! Order for one dilemma:
//! assess → duty boost (duty dilemmas only) → detect → resolve → core boost
//! → aggregate → sign.
//!
//! The core boost runs after resolution, so boosted scores never feed the
//! detector.

use chrono::Utc;

use crate::aggregate::{balance_score, mcda_score};
use crate::assessor::{assess_traits, DigestAssessor, TraitAssessor};
use crate::boost::{apply_core_boost, apply_duty_boost};
use crate::config::EngineConfig;
use crate::conflict::detect_conflicts;
use crate::dilemma::{Dilemma, TaskType};
use crate::interaction::InteractionMatrix;
use crate::provenance::{query_signature, DigestSigner, ProvenanceSigner};
use crate::report::DilemmaReport;
use crate::resolver::ConflictResolver;
use crate::taxonomy::Taxonomy;

/// Drives one dilemma at a time through the scoring pipeline.
///
/// Owns the only [`ConflictResolver`], so resolver state accumulates
/// across every dilemma this processor handles.
pub struct EthicalProcessor {
    config: EngineConfig,
    resolver: ConflictResolver,
    assessor: Box<dyn TraitAssessor>,
    fallback: DigestAssessor,
    signer: Box<dyn ProvenanceSigner>,
}

impl EthicalProcessor {
    /// Creates a processor with the digest assessor and signer.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let resolver = ConflictResolver::new(config.decay);
        Self::with_resolver(config, resolver)
    }

    /// Creates a processor around an existing resolver (e.g. a seeded one).
    #[must_use]
    pub fn with_resolver(config: EngineConfig, resolver: ConflictResolver) -> Self {
        Self {
            config,
            resolver,
            assessor: Box::new(DigestAssessor::new()),
            fallback: DigestAssessor::new(),
            signer: Box::new(DigestSigner::default()),
        }
    }

    /// Replaces the assessor.
    #[must_use]
    pub fn with_assessor(mut self, assessor: Box<dyn TraitAssessor>) -> Self {
        self.assessor = assessor;
        self
    }

    /// Replaces the signer.
    #[must_use]
    pub fn with_signer(mut self, signer: Box<dyn ProvenanceSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The resolver and its accumulated state.
    #[must_use]
    pub const fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    /// Mutable access to the resolver (e.g. to reset it).
    pub fn resolver_mut(&mut self) -> &mut ConflictResolver {
        &mut self.resolver
    }

    /// Scores `dilemma` against `taxonomy`.
    pub fn process(&mut self, dilemma: &Dilemma, taxonomy: &Taxonomy) -> DilemmaReport {
        let order = taxonomy.codes();

        // Assessment completes before the resolver is touched.
        let mut scores = assess_traits(
            self.assessor.as_ref(),
            &self.fallback,
            taxonomy,
            &dilemma.query,
            &dilemma.context,
        );

        if dilemma.task_type == TaskType::Duty {
            scores = apply_duty_boost(&scores, taxonomy, &self.config.boosts);
        }

        let matrix = InteractionMatrix::build(&order, &self.config.interactions);
        let pairs = detect_conflicts(&order, &scores, &matrix, &self.config.resolution);
        let resolution = self.resolver.resolve(&order, &pairs, &scores);

        let scores = apply_core_boost(&resolution.scores, &self.config.boosts);
        let mcda = mcda_score(&scores);
        let balance = balance_score(&scores);
        let signature = query_signature(self.signer.as_ref(), &dilemma.query, &dilemma.context);

        tracing::info!(
            dilemma = %dilemma.id,
            task_type = %dilemma.task_type,
            conflicts = resolution.conflicts.len(),
            mcda,
            balance,
            "dilemma processed"
        );

        DilemmaReport {
            dilemma_id: dilemma.id,
            task_type: dilemma.task_type,
            signature,
            scores,
            conflicts: resolution.conflicts,
            mcda_score: mcda,
            balance_score: balance,
            momentum: self.resolver.momentum(),
            hardware_compatible: true,
            processed_at: Utc::now(),
        }
    }
}

impl Default for EthicalProcessor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for EthicalProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthicalProcessor")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("assessor", &self.assessor.name())
            .field("signer", &self.signer.name())
            .finish()
    }
}
