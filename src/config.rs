//! Issuer configuration
//!
//! Everything has a default, so an empty file (or no file) is a valid config:
//!
//! ```toml
//! # Advertised as `jku` in every JWT header
//! jwk_set_url = "https://login.example.org/oidc/jwk"
//!
//! # Sign COSE envelopes with this loaded P-256 key instead of a fresh one
//! envelope_key_id = "ec1"
//! ```

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssuerConfig {
    /// URL of the JWK set holding the issuer's public keys
    pub jwk_set_url: Option<String>,
    /// Key id of a supplied P-256 key to sign binary envelopes with;
    /// `None` generates an ephemeral key per envelope
    pub envelope_key_id: Option<String>,
}

impl IssuerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
