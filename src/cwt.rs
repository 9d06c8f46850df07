//! CBOR Web Token encoding of a visa
//!
//! The same claims as the JWT, keyed by their registered CWT integer labels
//! and signed as a tagged COSE_Sign1. The visa object has no registered label,
//! so it goes under a private claim key.

use ciborium::Value;
use coset::cwt::{ClaimsSetBuilder, Timestamp};
use coset::{CborSerializable, CoseSign1Builder, HeaderBuilder, TaggedCborSerializable};

use crate::claims::VisaClaims;
use crate::error::Result;
use crate::key::KeyMaterial;
use crate::signer::SigningPrimitive;

/// Private claim key for the visa object
pub const VISA_CLAIM_KEY: i64 = -70001;

fn visa_object(claims: &VisaClaims) -> Value {
    let visa = &claims.visa;
    Value::Map(vec![
        (Value::Text("type".into()), Value::Text(visa.kind.clone())),
        (Value::Text("asserted".into()), Value::Integer(visa.asserted.into())),
        (Value::Text("value".into()), Value::Text(visa.value.clone())),
        (Value::Text("source".into()), Value::Text(visa.source.clone())),
        (Value::Text("by".into()), Value::Text(visa.by.as_str().into())),
    ])
}

/// Encode `claims` as a CWT signed by `primitive`
///
/// `cti` carries the 16 raw UUID bytes of `jti`, or its UTF-8 bytes when it
/// is not a UUID.
pub fn encode_cwt(
    claims: &VisaClaims,
    key: &KeyMaterial,
    primitive: &SigningPrimitive<'_>,
) -> Result<Vec<u8>> {
    let cti = match claims.jti_uuid() {
        Some(uuid) => uuid.as_bytes().to_vec(),
        None => claims.jti.as_bytes().to_vec(),
    };

    let claims_set = ClaimsSetBuilder::new()
        .issuer(claims.iss.clone())
        .subject(claims.sub.clone())
        .expiration_time(Timestamp::WholeSeconds(claims.exp))
        .issued_at(Timestamp::WholeSeconds(claims.iat))
        .cwt_id(cti)
        .private_claim(VISA_CLAIM_KEY, visa_object(claims))
        .build();
    let payload = claims_set.to_vec()?;

    let protected = HeaderBuilder::new()
        .algorithm(primitive.algorithm().cose())
        .key_id(key.kid().as_bytes().to_vec())
        .build();
    let mut sign1 = CoseSign1Builder::new()
        .protected(protected)
        .payload(payload)
        .build();

    let to_be_signed = sign1.tbs_data(&[]);
    sign1.signature = primitive.sign(&to_be_signed)?;

    log::debug!("encoded CWT for {:?} with {}", claims.sub, primitive.algorithm());
    Ok(sign1.to_tagged_vec()?)
}

#[cfg(test)]
mod tests {
    use coset::cwt::{ClaimName, ClaimsSet};
    use coset::{iana, CoseSign1, RegisteredLabelWithPrivate};
    use ed25519_dalek::Verifier as _;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::claims::assemble;
    use crate::clock::FixedClock;
    use crate::key::PrivateKey;
    use crate::signer::resolve_signer;
    use crate::signer::tests::{ed25519_key, p256_key};
    use crate::visa::tests::sample_visa;

    fn sample_claims() -> VisaClaims {
        let mut rng = StdRng::seed_from_u64(41);
        assemble(&sample_visa(), &FixedClock(1_760_000_000), &mut rng).unwrap()
    }

    #[test]
    fn test_cwt_claims_layout() {
        let key = KeyMaterial::new("ec1", "ES256", PrivateKey::P256(p256_key(42)));
        let claims = sample_claims();
        let cwt = encode_cwt(&claims, &key, &resolve_signer(&key).unwrap()).unwrap();

        // tag(18)
        assert_eq!(cwt[0], 0xd2);
        let sign1 = CoseSign1::from_tagged_slice(&cwt).unwrap();
        assert_eq!(
            sign1.protected.header.alg,
            Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES256))
        );
        assert_eq!(sign1.protected.header.key_id, b"ec1");

        let set = ClaimsSet::from_slice(sign1.payload.as_deref().unwrap()).unwrap();
        assert_eq!(set.issuer.as_deref(), Some("https://issuer.example/"));
        assert_eq!(set.subject.as_deref(), Some("user@example.org"));
        assert_eq!(set.expiration_time, Some(Timestamp::WholeSeconds(2_015_600_000)));
        assert_eq!(set.issued_at, Some(Timestamp::WholeSeconds(1_760_000_000)));
        assert_eq!(set.cwt_id.as_ref().map(Vec::len), Some(16));

        let (_, visa) = set
            .rest
            .iter()
            .find(|(name, _)| *name == ClaimName::PrivateUse(VISA_CLAIM_KEY))
            .unwrap();
        let Value::Map(entries) = visa else {
            panic!("visa claim is not a map");
        };
        assert!(entries.contains(&(
            Value::Text("type".into()),
            Value::Text("AcceptedTermsAndPolicies".into())
        )));
    }

    #[test]
    fn test_cwt_signature_verifies() {
        let ed = ed25519_key(43);
        let verifying = ed.verifying_key();
        let key = KeyMaterial::new("okp1", "EdDSA", PrivateKey::Ed25519(ed));
        let cwt = encode_cwt(&sample_claims(), &key, &resolve_signer(&key).unwrap()).unwrap();

        let sign1 = CoseSign1::from_tagged_slice(&cwt).unwrap();
        sign1
            .verify_signature(&[], |sig, data| {
                let sig = ed25519_dalek::Signature::from_slice(sig)?;
                verifying.verify(data, &sig)
            })
            .unwrap();
    }
}
