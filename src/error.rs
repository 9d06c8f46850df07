//! Error type shared by every issuance step
//!
//! Every failure is deterministic for a given input, so nothing here is
//! retried. Callers get the specific kind and decide how to report it.

use thiserror::Error;

use crate::key::KeyFamily;

/// Convenience alias used throughout the crate
pub type Result<T, E = VisaError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VisaError {
    /// The visa violates a precondition (e.g. expiry not after assertion)
    #[error("invalid visa: {0}")]
    InvalidVisa(String),

    /// The key's family or algorithm name cannot be signed with
    #[error("unsupported algorithm {alg:?} for {family} key")]
    UnsupportedAlgorithm { family: KeyFamily, alg: String },

    /// The underlying cryptographic operation failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Input to the transcoder was not valid JSON
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// Serializing a header, claims set or envelope failed
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// No key with this identifier was supplied
    #[error("unknown key id {0:?}")]
    UnknownKeyId(String),

    /// An Ed25519 seed was not 32 bytes of hex
    #[error("invalid seed for key id {kid:?}: {reason}")]
    InvalidSeed { kid: String, reason: String },

    /// The system random source is unusable
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<coset::CoseError> for VisaError {
    fn from(err: coset::CoseError) -> Self {
        Self::Encoding(err.to_string())
    }
}
