//! Raw per-trait assessment.
//!
//! The assessor is an external collaborator (a model call in production).
//! Its failures never reach the caller: an error or an out-of-range score
//! is replaced by a deterministic digest-derived fallback.

use crate::dilemma::{canonical_context, Context};
use crate::error::AssessmentError;
use crate::score::{ScoreMap, SCORE_MAX, SCORE_MIN};
use crate::taxonomy::{Taxonomy, TraitCode, TraitDefinition};

/// Produces a raw score for one trait.
pub trait TraitAssessor: Send {
    /// Name of the assessor (for logging).
    fn name(&self) -> &str;

    /// Scores `code` for the given query and context.
    ///
    /// A well-behaved assessor returns a value in `[0, 30000]`.
    ///
    /// # Errors
    /// Any collaborator failure. The caller substitutes a fallback score.
    fn assess(
        &self,
        code: &TraitCode,
        definition: &TraitDefinition,
        query: &str,
        context: &Context,
    ) -> Result<i64, AssessmentError>;
}

/// Deterministic assessor derived from a blake3 digest of the trait code,
/// the query and the canonical context.
///
/// Used as the fallback for every other assessor, and as the default
/// assessor when no model is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestAssessor;

impl DigestAssessor {
    /// Creates the assessor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Digest score in `[0, 30000]`. Infallible.
    #[must_use]
    pub fn score(&self, code: &TraitCode, query: &str, context: &Context) -> i64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(code.as_str().as_bytes());
        hasher.update(query.as_bytes());
        hasher.update(canonical_context(context).as_bytes());
        let digest = hasher.finalize();

        let bytes = digest.as_bytes();
        let prefix = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        i64::from(prefix) % (SCORE_MAX + 1)
    }
}

impl TraitAssessor for DigestAssessor {
    fn name(&self) -> &str {
        "digest"
    }

    fn assess(
        &self,
        code: &TraitCode,
        _definition: &TraitDefinition,
        query: &str,
        context: &Context,
    ) -> Result<i64, AssessmentError> {
        Ok(self.score(code, query, context))
    }
}

/// Scores every trait of `taxonomy`, in taxonomy order.
///
/// All assessor calls complete before this returns.
pub fn assess_traits(
    assessor: &dyn TraitAssessor,
    fallback: &DigestAssessor,
    taxonomy: &Taxonomy,
    query: &str,
    context: &Context,
) -> ScoreMap {
    let mut scores = ScoreMap::with_capacity(taxonomy.len());
    for (code, definition) in taxonomy.iter() {
        let score = match assessor.assess(code, definition, query, context) {
            Ok(value) if (SCORE_MIN..=SCORE_MAX).contains(&value) => value,
            Ok(value) => {
                tracing::warn!(
                    assessor = assessor.name(),
                    trait_code = %code,
                    value,
                    "assessor score out of range; using fallback"
                );
                fallback.score(code, query, context)
            }
            Err(err) => {
                tracing::warn!(
                    assessor = assessor.name(),
                    trait_code = %code,
                    error = %err,
                    "assessor failed; using fallback"
                );
                fallback.score(code, query, context)
            }
        };
        scores.insert(code.clone(), score);
    }
    scores
}
