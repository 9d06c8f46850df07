//! Signed text tokens (compact JWS / JWT)
//!
//! A token is `<header>.<claims>.<signature>`, each segment base64url without
//! padding. The first two segments joined by `.` are exactly the bytes that
//! were signed: they are encoded once and both signed and embedded from the
//! same buffer, so a verifier re-deriving the signing input from the token
//! gets what we signed.

use core::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::claims::VisaClaims;
use crate::error::{Result, VisaError};
use crate::key::KeyMaterial;
use crate::signer::SigningPrimitive;

/// `typ` header value for claims tokens
pub const JWT_TYPE: &str = "JWT";

const SEPARATOR: char = '.';

/// JOSE header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    pub kid: String,
    pub typ: String,
    /// JWK set URL the verifier can fetch `kid` from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jku: Option<String>,
}

impl Header {
    /// Header naming `key`'s algorithm and identifier
    pub fn for_key(key: &KeyMaterial) -> Self {
        Self {
            alg: key.alg().to_owned(),
            kid: key.kid().to_owned(),
            typ: JWT_TYPE.to_owned(),
            jku: None,
        }
    }

    pub fn with_jwk_set_url(mut self, url: Option<String>) -> Self {
        self.jku = url;
        self
    }
}

/// A complete signed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTextToken {
    token: String,
    // Byte offsets of the two separators
    first_dot: usize,
    second_dot: usize,
}

impl SignedTextToken {
    /// Split an existing compact token into its segments
    pub fn parse(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let mut dots = token.match_indices(SEPARATOR).map(|(i, _)| i);
        let (Some(first_dot), Some(second_dot), None) = (dots.next(), dots.next(), dots.next())
        else {
            return Err(VisaError::Encoding(
                "compact token must have exactly three segments".into(),
            ));
        };
        Ok(Self {
            token,
            first_dot,
            second_dot,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    /// `<header>.<claims>`, the bytes the signature covers
    pub fn signing_input(&self) -> &str {
        &self.token[..self.second_dot]
    }

    pub fn header_segment(&self) -> &str {
        &self.token[..self.first_dot]
    }

    pub fn claims_segment(&self) -> &str {
        &self.token[self.first_dot + 1..self.second_dot]
    }

    pub fn signature_segment(&self) -> &str {
        &self.token[self.second_dot + 1..]
    }

    pub fn header(&self) -> Result<Header> {
        let json = decode_segment(self.header_segment())?;
        serde_json::from_slice(&json).map_err(VisaError::MalformedPayload)
    }

    /// The claims JSON exactly as it was signed
    pub fn claims_json(&self) -> Result<Vec<u8>> {
        decode_segment(self.claims_segment())
    }

    pub fn claims(&self) -> Result<VisaClaims> {
        serde_json::from_slice(&self.claims_json()?).map_err(VisaError::MalformedPayload)
    }

    pub fn signature(&self) -> Result<Vec<u8>> {
        decode_segment(self.signature_segment())
    }

    pub fn len(&self) -> usize {
        self.token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Display for SignedTextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| VisaError::Encoding(format!("bad base64url segment: {e}")))
}

fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| VisaError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Sign `claims` with `primitive`, naming `key` in the header
pub fn encode(
    claims: &VisaClaims,
    key: &KeyMaterial,
    primitive: &SigningPrimitive<'_>,
) -> Result<SignedTextToken> {
    encode_with_header(&Header::for_key(key), claims, primitive)
}

/// Sign `claims` under an explicit header
///
/// The header's `alg` must be the primitive's algorithm; a token whose header
/// disagrees with its signature would never verify.
pub fn encode_with_header(
    header: &Header,
    claims: &VisaClaims,
    primitive: &SigningPrimitive<'_>,
) -> Result<SignedTextToken> {
    if header.alg != primitive.algorithm().name() {
        return Err(VisaError::Signing(format!(
            "header names {} but signer produces {}",
            header.alg,
            primitive.algorithm()
        )));
    }

    let mut token = encode_json(header)?;
    let first_dot = token.len();
    token.push(SEPARATOR);
    token.push_str(&encode_json(claims)?);
    let second_dot = token.len();

    let signature = primitive.sign(token.as_bytes())?;

    token.push(SEPARATOR);
    token.push_str(&URL_SAFE_NO_PAD.encode(signature));

    Ok(SignedTextToken {
        token,
        first_dot,
        second_dot,
    })
}
