//! Binary signed envelope (COSE_Sign, ES256)
//!
//! Wraps a CBOR payload in a tagged COSE_Sign message with a single signer:
//! - Pick the signing key: a fresh ephemeral P-256 key, or a supplied one
//! - Attach a signer entry whose unprotected header carries `alg` and `kid`
//! - Sign the COSE `Sig_structure` over the content
//! - Serialize with CBOR tag 98
//!
//! An ephemeral key exists only for the duration of [`sign_binary`]. The
//! returned [`SignedEnvelope`] holds its public half so the caller can publish
//! it alongside the envelope.

use coset::{iana, CoseSignBuilder, CoseSignatureBuilder, HeaderBuilder, TaggedCborSerializable};
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VisaError};

/// Which key signs the envelope
#[derive(Clone, Copy)]
pub enum EnvelopeKey<'k> {
    /// Generate a fresh key for this envelope only
    Ephemeral,
    /// Reuse a loaded P-256 key
    Supplied { kid: &'k str, key: &'k SigningKey },
}

/// Wrapper for the ephemeral key that guarantees zeroization
#[derive(ZeroizeOnDrop)]
struct EphemeralSigningKey {
    #[zeroize(skip)] // p256::ecdsa::SigningKey zeroizes itself on drop
    inner: SigningKey,
}

impl EphemeralSigningKey {
    fn new<R: RngCore + CryptoRng + ?Sized>(mut rng: &mut R) -> Self {
        Self {
            inner: SigningKey::random(&mut rng),
        }
    }
}

/// A serialized COSE_Sign message plus the key that verifies it
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    bytes: Vec<u8>,
    key_id: Vec<u8>,
    verifying_key: VerifyingKey,
}

impl SignedEnvelope {
    /// The tagged COSE_Sign wire form
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The `kid` carried in the signer entry
    pub fn key_id(&self) -> &[u8] {
        &self.key_id
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Key id for an ephemeral key: SHA-256 of its compressed SEC1 point
pub fn ephemeral_key_id(key: &VerifyingKey) -> Vec<u8> {
    Sha256::digest(key.as_affine().to_encoded_point(true).as_bytes()).to_vec()
}

/// Sign `payload` (well-formed CBOR) into a COSE_Sign envelope
pub fn sign_binary<R>(payload: &[u8], key: EnvelopeKey<'_>, rng: &mut R) -> Result<SignedEnvelope>
where
    R: RngCore + CryptoRng + ?Sized,
{
    // Content must be one complete CBOR item
    let mut reader = payload;
    ciborium::from_reader::<ciborium::Value, _>(&mut reader)
        .map_err(|e| VisaError::Encoding(format!("payload is not well-formed CBOR: {e}")))?;
    if !reader.is_empty() {
        return Err(VisaError::Encoding(format!(
            "payload has {} trailing bytes after the CBOR item",
            reader.len()
        )));
    }

    // Ephemeral key lives only for this scope
    let ephemeral;
    let (signing_key, key_id) = match key {
        EnvelopeKey::Ephemeral => {
            ephemeral = EphemeralSigningKey::new(rng);
            let kid = ephemeral_key_id(ephemeral.inner.verifying_key());
            (&ephemeral.inner, kid)
        }
        EnvelopeKey::Supplied { kid, key } => (key, kid.as_bytes().to_vec()),
    };
    log::debug!(
        "signing {}-byte envelope payload with {} key",
        payload.len(),
        if matches!(key, EnvelopeKey::Ephemeral) { "ephemeral" } else { "supplied" }
    );

    let mut signer_entry = CoseSignatureBuilder::new()
        .unprotected(
            HeaderBuilder::new()
                .algorithm(iana::Algorithm::ES256)
                .key_id(key_id.clone())
                .build(),
        )
        .build();

    let mut message = CoseSignBuilder::new().payload(payload.to_vec()).build();

    // Sign
    let to_be_signed = message.tbs_data(&[], &signer_entry);
    let signature: Signature = signing_key
        .try_sign(&to_be_signed)
        .map_err(|e| VisaError::Signing(e.to_string()))?;
    signer_entry.signature = signature.to_bytes().to_vec();
    message.signatures.push(signer_entry);

    let verifying_key = VerifyingKey::from(signing_key);
    let bytes = message.to_tagged_vec()?;

    // ephemeral is dropped and zeroized here

    Ok(SignedEnvelope {
        bytes,
        key_id,
        verifying_key,
    })
}

#[cfg(test)]
mod tests {
    use coset::CoseSign;
    use p256::ecdsa::signature::Verifier as _;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::signer::tests::p256_key;

    fn cbor_payload() -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::into_writer(&serde_json::json!({"sub": "user@example.org"}), &mut out).unwrap();
        out
    }

    fn verify(envelope: &SignedEnvelope) -> CoseSign {
        let message = CoseSign::from_tagged_slice(envelope.as_bytes()).unwrap();
        assert_eq!(message.signatures.len(), 1);
        let signer = &message.signatures[0];
        message
            .verify_signature(0, &[], |sig, data| {
                let sig = Signature::from_slice(sig).map_err(|e| e.to_string())?;
                envelope
                    .verifying_key()
                    .verify(data, &sig)
                    .map_err(|e| e.to_string())
            })
            .unwrap();
        assert!(signer.protected.header.is_empty());
        message
    }

    #[test]
    fn test_ephemeral_envelope_verifies() {
        let mut rng = StdRng::seed_from_u64(31);
        let payload = cbor_payload();
        let envelope = sign_binary(&payload, EnvelopeKey::Ephemeral, &mut rng).unwrap();

        let message = verify(&envelope);
        assert_eq!(message.payload.as_deref(), Some(payload.as_slice()));

        let header = &message.signatures[0].unprotected;
        assert_eq!(
            header.alg,
            Some(coset::RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES256))
        );
        assert_eq!(header.key_id, envelope.key_id());
        assert_eq!(envelope.key_id(), ephemeral_key_id(envelope.verifying_key()));
    }

    #[test]
    fn test_ephemeral_keys_are_not_reused() {
        let mut rng = StdRng::seed_from_u64(32);
        let payload = cbor_payload();
        let a = sign_binary(&payload, EnvelopeKey::Ephemeral, &mut rng).unwrap();
        let b = sign_binary(&payload, EnvelopeKey::Ephemeral, &mut rng).unwrap();
        assert_ne!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn test_supplied_key_envelope() {
        let mut rng = StdRng::seed_from_u64(33);
        let key = p256_key(34);
        let envelope = sign_binary(
            &cbor_payload(),
            EnvelopeKey::Supplied { kid: "ec1", key: &key },
            &mut rng,
        )
        .unwrap();

        verify(&envelope);
        assert_eq!(envelope.key_id(), b"ec1");
        assert_eq!(envelope.verifying_key(), key.verifying_key());
    }

    #[test]
    fn test_tagged_with_cose_sign() {
        let mut rng = StdRng::seed_from_u64(35);
        let envelope = sign_binary(&cbor_payload(), EnvelopeKey::Ephemeral, &mut rng).unwrap();
        // tag(98)
        assert_eq!(&envelope.as_bytes()[..2], &[0xd8, 0x62]);
    }

    #[test]
    fn test_malformed_payload_is_encoding_error() {
        let mut rng = StdRng::seed_from_u64(36);
        // Text string header claiming 5 bytes with only 2 present
        let err = sign_binary(&[0x65, b'a', b'b'], EnvelopeKey::Ephemeral, &mut rng).unwrap_err();
        assert!(matches!(err, VisaError::Encoding(_)));

        let mut trailing = cbor_payload();
        trailing.push(0x00);
        let err = sign_binary(&trailing, EnvelopeKey::Ephemeral, &mut rng).unwrap_err();
        assert!(matches!(err, VisaError::Encoding(_)));
    }
}
