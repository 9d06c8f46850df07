//! JSON to CBOR transcoding
//!
//! The binary envelope carries the same claims as an already-issued text
//! token. Rather than re-assembling them (which would mint a new `jti`), the
//! token's claims JSON is parsed into a generic value tree and re-emitted as
//! CBOR.
//!
//! Objects are held in a sorted map while parsing, so the CBOR map keys come
//! out in lexicographic order regardless of the input order.

use crate::error::{Result, VisaError};

/// Re-encode JSON bytes as CBOR
pub fn to_canonical_binary(json: &[u8]) -> Result<Vec<u8>> {
    let tree: serde_json::Value =
        serde_json::from_slice(json).map_err(VisaError::MalformedPayload)?;

    let mut cbor = Vec::with_capacity(json.len());
    ciborium::into_writer(&tree, &mut cbor).map_err(|e| VisaError::Encoding(e.to_string()))?;

    log::debug!("transcoded {} JSON bytes to {} CBOR bytes", json.len(), cbor.len());
    Ok(cbor)
}

/// Decode CBOR produced by [`to_canonical_binary`] back into a JSON tree
pub fn from_canonical_binary(cbor: &[u8]) -> Result<serde_json::Value> {
    ciborium::from_reader(cbor).map_err(|e| VisaError::Encoding(e.to_string()))
}
