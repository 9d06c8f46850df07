//! Issuance pipeline
//!
//! [`Issuer`] binds a config and a clock and runs the one-shot pipelines:
//! 1. Visa → claims → JWT signed with a loaded key
//! 2. An issued JWT's claims JSON → CBOR → COSE_Sign envelope
//! 3. Visa → claims → CWT signed with a loaded key
//!
//! Nothing is cached between calls, so one issuer can be shared across
//! threads as long as each caller brings its own RNG.

use rand_core::{CryptoRng, RngCore};

use crate::claims::{self, VisaClaims};
use crate::clock::{Clock, SystemClock};
use crate::config::IssuerConfig;
use crate::cwt;
use crate::envelope::{self, EnvelopeKey, SignedEnvelope};
use crate::error::{Result, VisaError};
use crate::jwt::{self, Header, SignedTextToken};
use crate::key::{Algorithm, KeyMaterial};
use crate::signer::resolve_signer;
use crate::transcode;
use crate::visa::Visa;

#[derive(Debug, Clone)]
pub struct Issuer<C = SystemClock> {
    config: IssuerConfig,
    clock: C,
}

impl Issuer {
    pub fn new(config: IssuerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Issuer<C> {
    pub fn with_clock(config: IssuerConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Assemble fresh claims for `visa`
    pub fn claims<R>(&self, visa: &Visa, rng: &mut R) -> Result<VisaClaims>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        claims::assemble(visa, &self.clock, rng)
    }

    /// Issue `visa` as a JWT signed with `key`
    ///
    /// The signer is resolved before claims are assembled, so an unusable key
    /// fails without consuming randomness or reading the clock.
    pub fn issue_text_token<R>(
        &self,
        visa: &Visa,
        key: &KeyMaterial,
        rng: &mut R,
    ) -> Result<SignedTextToken>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        visa.validate()?;
        let primitive = resolve_signer(key)?;
        let claims = self.claims(visa, rng)?;

        log::debug!("signing JWT with {} key {:?}", key.family(), key.kid());
        let header = Header::for_key(key).with_jwk_set_url(self.config.jwk_set_url.clone());
        jwt::encode_with_header(&header, &claims, &primitive)
    }

    /// Re-encode an issued token's claims as a signed COSE_Sign envelope
    ///
    /// `keys` is searched only when the config names an envelope key.
    pub fn issue_binary_envelope<R>(
        &self,
        token: &SignedTextToken,
        keys: &[KeyMaterial],
        rng: &mut R,
    ) -> Result<SignedEnvelope>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let payload = transcode::to_canonical_binary(&token.claims_json()?)?;
        let envelope_key = self.envelope_key(keys)?;
        envelope::sign_binary(&payload, envelope_key, rng)
    }

    /// Issue `visa` as a CWT signed with `key`
    pub fn issue_cwt<R>(&self, visa: &Visa, key: &KeyMaterial, rng: &mut R) -> Result<Vec<u8>>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        visa.validate()?;
        let primitive = resolve_signer(key)?;
        let claims = self.claims(visa, rng)?;
        cwt::encode_cwt(&claims, key, &primitive)
    }

    fn envelope_key<'k>(&self, keys: &'k [KeyMaterial]) -> Result<EnvelopeKey<'k>> {
        let Some(kid) = self.config.envelope_key_id.as_deref() else {
            return Ok(EnvelopeKey::Ephemeral);
        };

        let material = keys
            .iter()
            .find(|k| k.kid() == kid)
            .ok_or_else(|| VisaError::UnknownKeyId(kid.to_owned()))?;
        let unsupported = || VisaError::UnsupportedAlgorithm {
            family: material.family(),
            alg: material.alg().to_owned(),
        };
        if Algorithm::from_name(material.alg()) != Some(Algorithm::Es256) {
            return Err(unsupported());
        }
        let key = material.p256().ok_or_else(unsupported)?;

        Ok(EnvelopeKey::Supplied {
            kid: material.kid(),
            key,
        })
    }
}
