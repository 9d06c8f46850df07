//! Compact plaintext visas
//!
//! A lighter alternative to the JWT: the visa content is an opaque string,
//! signed as-is with Ed25519 and shipped as `{"v": content, "k": kid, "s": sig}`.
//! Keys are Ed25519 seeds held in a [`Keyring`] by key id.

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer as _, SigningKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Result, VisaError};

/// Ed25519 seeds by key id, as lowercase or uppercase hex
#[derive(Default)]
pub struct Keyring {
    seeds: BTreeMap<String, Zeroizing<String>>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the seed for `kid`
    ///
    /// The seed is only checked when it is used to sign.
    pub fn insert(&mut self, kid: impl Into<String>, seed_hex: impl Into<String>) {
        self.seeds.insert(kid.into(), Zeroizing::new(seed_hex.into()));
    }

    pub fn with(mut self, kid: impl Into<String>, seed_hex: impl Into<String>) -> Self {
        self.insert(kid, seed_hex);
        self
    }

    fn signing_key(&self, kid: &str) -> Result<SigningKey> {
        let seed_hex = self
            .seeds
            .get(kid)
            .ok_or_else(|| VisaError::UnknownKeyId(kid.to_owned()))?;

        let invalid = |reason: String| VisaError::InvalidSeed {
            kid: kid.to_owned(),
            reason,
        };
        let mut seed = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(seed_hex.as_str(), &mut *seed).map_err(|e| match e {
            hex::FromHexError::InvalidStringLength | hex::FromHexError::OddLength => invalid(
                format!("must be exactly 32 bytes but was {} hex digits", seed_hex.len()),
            ),
            other => invalid(format!("not hex: {other}")),
        })?;

        Ok(SigningKey::from_bytes(&seed))
    }
}

/// A signed compact visa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactVisa {
    /// Visa content, signed byte-for-byte as UTF-8
    pub v: String,
    /// Key id
    pub k: String,
    /// base64url Ed25519 signature over `v`
    pub s: String,
}

/// Sign `content` with the seed stored under `kid`
pub fn sign_compact(keyring: &Keyring, content: &str, kid: &str) -> Result<CompactVisa> {
    let key = keyring.signing_key(kid)?;
    let signature = key
        .try_sign(content.as_bytes())
        .map_err(|e| VisaError::Signing(e.to_string()))?;

    Ok(CompactVisa {
        v: content.to_owned(),
        k: kid.to_owned(),
        s: URL_SAFE_NO_PAD.encode(signature.to_bytes()),
    })
}
