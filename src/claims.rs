//! Claims assembly
//!
//! Turns a [`Visa`] into the claims set embedded in every encoding. Two calls
//! with the same visa never produce the same claims: each gets a fresh random
//! `jti`, so tokens issued for identical visas cannot be confused on replay.

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::Result;
use crate::visa::{AssertedBy, Visa};

/// Claim name the assertion is nested under
pub const VISA_CLAIM: &str = "ga4gh_visa_v1";

/// The nested assertion object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub asserted: i64,
    pub value: String,
    pub source: String,
    pub by: AssertedBy,
}

/// Claims set for one issued visa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "ga4gh_visa_v1")]
    pub visa: VisaObject,
}

/// Build the claims set for `visa`
///
/// Reads `clock` once for `iat` and draws 16 bytes from `rng` for the
/// version-4 UUID `jti`.
pub fn assemble<C, R>(visa: &Visa, clock: &C, rng: &mut R) -> Result<VisaClaims>
where
    C: Clock + ?Sized,
    R: RngCore + CryptoRng + ?Sized,
{
    visa.validate()?;

    let mut id = [0u8; 16];
    rng.fill_bytes(&mut id);
    let jti = uuid::Builder::from_random_bytes(id).into_uuid();

    Ok(VisaClaims {
        iss: visa.issuer.clone(),
        sub: visa.subject.clone(),
        iat: clock.now_secs(),
        exp: visa.expires_at,
        jti: jti.hyphenated().to_string(),
        visa: VisaObject {
            kind: visa.kind.clone(),
            asserted: visa.asserted_at,
            value: visa.value.clone(),
            source: visa.source.clone(),
            by: visa.asserted_by,
        },
    })
}

impl VisaClaims {
    /// The `jti` as a UUID, when it is one
    pub fn jti_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.jti).ok()
    }
}
