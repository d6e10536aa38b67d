//! Provenance signatures for dilemma reports.
//!
//! Signing is advisory: a signer failure leaves the report unsigned but
//! never blocks score computation.

use crate::dilemma::{canonical_context, Context};
use crate::error::SigningError;

const KEY_CONTEXT: &str = "cocorels 2024 provenance signing key v1";

/// Signs opaque payloads.
pub trait ProvenanceSigner: Send {
    /// Name of the signer (for logging).
    fn name(&self) -> &str;

    /// Signs `payload`.
    ///
    /// # Errors
    /// Any signer failure.
    fn sign(&self, payload: &[u8]) -> Result<String, SigningError>;
}

/// Keyed blake3 signer.
#[derive(Clone)]
pub struct DigestSigner {
    key: [u8; 32],
}

impl DigestSigner {
    /// Creates a signer from raw key material.
    #[must_use]
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derives the key from a passphrase.
    #[must_use]
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::new(blake3::derive_key(KEY_CONTEXT, passphrase.as_bytes()))
    }
}

impl Default for DigestSigner {
    fn default() -> Self {
        Self::from_passphrase("simulation")
    }
}

impl std::fmt::Debug for DigestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestSigner").finish_non_exhaustive()
    }
}

impl ProvenanceSigner for DigestSigner {
    fn name(&self) -> &str {
        "blake3_keyed"
    }

    fn sign(&self, payload: &[u8]) -> Result<String, SigningError> {
        Ok(blake3::keyed_hash(&self.key, payload).to_hex().to_string())
    }
}

/// Builds `"<digest>:<signature>"` for a query and its context.
///
/// The digest covers `query|canonical_context`. When the signer fails the
/// result is an empty string.
pub fn query_signature(signer: &dyn ProvenanceSigner, query: &str, context: &Context) -> String {
    let base = format!("{query}|{}", canonical_context(context));
    let digest = blake3::hash(base.as_bytes()).to_hex();

    match signer.sign(digest.as_bytes()) {
        Ok(signature) => format!("{digest}:{signature}"),
        Err(err) => {
            tracing::warn!(signer = signer.name(), error = %err, "provenance signing failed; report left unsigned");
            String::new()
        }
    }
}
