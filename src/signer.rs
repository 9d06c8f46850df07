//! Signing primitive dispatch
//!
//! A [`SigningPrimitive`] borrows the private key from a [`KeyMaterial`] and
//! exposes one operation, `sign(bytes)`. Which primitive a key gets is decided
//! once by [`resolve_signer`]:
//! - RSA keys sign with PKCS#1 v1.5 (`RS*`) or PSS (`PS*`)
//! - EC keys sign with ECDSA on the curve the algorithm names (`ES256`, `ES384`)
//! - OKP keys sign with Ed25519 (`EdDSA`)
//!
//! Anything else is refused outright. There is no default algorithm.

use p256::ecdsa::signature::Signer as _;
use rand_core::OsRng;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Result, VisaError};
use crate::key::{Algorithm, KeyMaterial, PrivateKey};

/// Hash paired with an RSA signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaHash {
    Sha256,
    Sha384,
    Sha512,
}

impl RsaHash {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn pkcs1v15(self) -> Pkcs1v15Sign {
        match self {
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            Self::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            Self::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    // Salt length equals the digest length, as JWA requires
    fn pss(self) -> Pss {
        match self {
            Self::Sha256 => Pss::new::<Sha256>(),
            Self::Sha384 => Pss::new::<Sha384>(),
            Self::Sha512 => Pss::new::<Sha512>(),
        }
    }
}

/// A ready-to-use signing capability bound to one key
#[derive(Clone, Copy)]
pub enum SigningPrimitive<'k> {
    RsaPkcs1v15 { key: &'k RsaPrivateKey, hash: RsaHash },
    RsaPss { key: &'k RsaPrivateKey, hash: RsaHash },
    Es256(&'k p256::ecdsa::SigningKey),
    Es384(&'k p384::ecdsa::SigningKey),
    EdDsa(&'k ed25519_dalek::SigningKey),
}

impl SigningPrimitive<'_> {
    /// The algorithm this primitive produces signatures for
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::RsaPkcs1v15 { hash, .. } => match hash {
                RsaHash::Sha256 => Algorithm::Rs256,
                RsaHash::Sha384 => Algorithm::Rs384,
                RsaHash::Sha512 => Algorithm::Rs512,
            },
            Self::RsaPss { hash, .. } => match hash {
                RsaHash::Sha256 => Algorithm::Ps256,
                RsaHash::Sha384 => Algorithm::Ps384,
                RsaHash::Sha512 => Algorithm::Ps512,
            },
            Self::Es256(_) => Algorithm::Es256,
            Self::Es384(_) => Algorithm::Es384,
            Self::EdDsa(_) => Algorithm::EdDsa,
        }
    }

    /// Sign `message`, returning the raw JWS/COSE signature bytes
    ///
    /// ECDSA output is the fixed-width `r || s` concatenation, not DER.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = match self {
            Self::RsaPkcs1v15 { key, hash } => key
                .sign(hash.pkcs1v15(), &hash.digest(message))
                .map_err(signing_error)?,
            Self::RsaPss { key, hash } => key
                .sign_with_rng(&mut OsRng, hash.pss(), &hash.digest(message))
                .map_err(signing_error)?,
            Self::Es256(key) => {
                let sig: p256::ecdsa::Signature = key.try_sign(message).map_err(signing_error)?;
                sig.to_bytes().to_vec()
            }
            Self::Es384(key) => {
                let sig: p384::ecdsa::Signature = key.try_sign(message).map_err(signing_error)?;
                sig.to_bytes().to_vec()
            }
            Self::EdDsa(key) => {
                let sig: ed25519_dalek::Signature = key.try_sign(message).map_err(signing_error)?;
                sig.to_bytes().to_vec()
            }
        };
        Ok(signature)
    }
}

fn signing_error(err: impl core::fmt::Display) -> VisaError {
    VisaError::Signing(err.to_string())
}

/// Pick the signing primitive for `key`
///
/// Fails with [`VisaError::UnsupportedAlgorithm`] when the declared algorithm
/// is unknown, belongs to another family, or names a different curve than the
/// key is on. No signature is computed here.
pub fn resolve_signer(key: &KeyMaterial) -> Result<SigningPrimitive<'_>> {
    let unsupported = || VisaError::UnsupportedAlgorithm {
        family: key.family(),
        alg: key.alg().to_owned(),
    };

    let alg = Algorithm::from_name(key.alg()).ok_or_else(unsupported)?;
    if alg.family() != key.family() {
        return Err(unsupported());
    }

    let primitive = match key.private_key() {
        PrivateKey::Rsa(rsa) => match alg {
            Algorithm::Rs256 => SigningPrimitive::RsaPkcs1v15 { key: rsa, hash: RsaHash::Sha256 },
            Algorithm::Rs384 => SigningPrimitive::RsaPkcs1v15 { key: rsa, hash: RsaHash::Sha384 },
            Algorithm::Rs512 => SigningPrimitive::RsaPkcs1v15 { key: rsa, hash: RsaHash::Sha512 },
            Algorithm::Ps256 => SigningPrimitive::RsaPss { key: rsa, hash: RsaHash::Sha256 },
            Algorithm::Ps384 => SigningPrimitive::RsaPss { key: rsa, hash: RsaHash::Sha384 },
            Algorithm::Ps512 => SigningPrimitive::RsaPss { key: rsa, hash: RsaHash::Sha512 },
            _ => return Err(unsupported()),
        },
        PrivateKey::P256(ec) if alg == Algorithm::Es256 => SigningPrimitive::Es256(ec),
        PrivateKey::P384(ec) if alg == Algorithm::Es384 => SigningPrimitive::Es384(ec),
        PrivateKey::P256(_) | PrivateKey::P384(_) => return Err(unsupported()),
        PrivateKey::Ed25519(ed) => SigningPrimitive::EdDsa(ed),
        PrivateKey::Oct(_) => return Err(unsupported()),
    };

    log::debug!("resolved {} signer for {} key {:?}", alg, key.family(), key.kid());
    Ok(primitive)
}

#[cfg(test)]
pub(crate) mod tests {
    use ed25519_dalek::Verifier as _;
    use p256::ecdsa::signature::Verifier as _;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use zeroize::Zeroizing;

    use super::*;
    use crate::key::KeyFamily;

    pub(crate) fn rsa_key(seed: u64) -> RsaPrivateKey {
        let mut rng = StdRng::seed_from_u64(seed);
        RsaPrivateKey::new(&mut rng, 1024).unwrap()
    }

    pub(crate) fn p256_key(seed: u64) -> p256::ecdsa::SigningKey {
        let mut rng = StdRng::seed_from_u64(seed);
        p256::ecdsa::SigningKey::random(&mut rng)
    }

    pub(crate) fn ed25519_key(seed: u64) -> ed25519_dalek::SigningKey {
        let mut rng = StdRng::seed_from_u64(seed);
        ed25519_dalek::SigningKey::generate(&mut rng)
    }

    #[test]
    fn test_rsa_pkcs1v15_verifies() {
        let rsa = rsa_key(1);
        let public = rsa.to_public_key();
        let key = KeyMaterial::new("rsa1", "RS256", PrivateKey::Rsa(Box::new(rsa)));
        let signer = resolve_signer(&key).unwrap();
        assert_eq!(signer.algorithm(), Algorithm::Rs256);

        let sig = signer.sign(b"payload").unwrap();
        assert_eq!(sig.len(), 128);
        public
            .verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(b"payload"), &sig)
            .unwrap();
    }

    #[test]
    fn test_rsa_pss_verifies() {
        let rsa = rsa_key(2);
        let public = rsa.to_public_key();
        let key = KeyMaterial::new("rsa2", "PS384", PrivateKey::Rsa(Box::new(rsa)));
        let signer = resolve_signer(&key).unwrap();

        let sig = signer.sign(b"payload").unwrap();
        public
            .verify(Pss::new::<Sha384>(), &Sha384::digest(b"payload"), &sig)
            .unwrap();
    }

    #[test]
    fn test_es256_is_fixed_width_and_verifies() {
        let ec = p256_key(3);
        let verifying = p256::ecdsa::VerifyingKey::from(&ec);
        let key = KeyMaterial::new("ec1", "ES256", PrivateKey::P256(ec));

        let sig = resolve_signer(&key).unwrap().sign(b"payload").unwrap();
        assert_eq!(sig.len(), 64);
        let sig = p256::ecdsa::Signature::from_slice(&sig).unwrap();
        verifying.verify(b"payload", &sig).unwrap();
    }

    #[test]
    fn test_es384_is_fixed_width_and_verifies() {
        let mut rng = StdRng::seed_from_u64(4);
        let ec = p384::ecdsa::SigningKey::random(&mut rng);
        let verifying = p384::ecdsa::VerifyingKey::from(&ec);
        let key = KeyMaterial::new("ec384", "ES384", PrivateKey::P384(ec));

        let sig = resolve_signer(&key).unwrap().sign(b"payload").unwrap();
        assert_eq!(sig.len(), 96);
        let sig = p384::ecdsa::Signature::from_slice(&sig).unwrap();
        verifying.verify(b"payload", &sig).unwrap();
    }

    #[test]
    fn test_eddsa_verifies() {
        let ed = ed25519_key(5);
        let verifying = ed.verifying_key();
        let key = KeyMaterial::new("okp1", "EdDSA", PrivateKey::Ed25519(ed));

        let sig = resolve_signer(&key).unwrap().sign(b"payload").unwrap();
        assert_eq!(sig.len(), 64);
        let sig = ed25519_dalek::Signature::from_slice(&sig).unwrap();
        verifying.verify(b"payload", &sig).unwrap();
    }

    #[test]
    fn test_symmetric_key_is_unsupported() {
        let key = KeyMaterial::new("hmac", "HS256", PrivateKey::Oct(Zeroizing::new(vec![7; 32])));
        match resolve_signer(&key) {
            Err(VisaError::UnsupportedAlgorithm { family, alg }) => {
                assert_eq!(family, KeyFamily::Oct);
                assert_eq!(alg, "HS256");
            }
            other => panic!("expected UnsupportedAlgorithm, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_algorithm_family_mismatch_is_unsupported() {
        let key = KeyMaterial::new("okp1", "ES256", PrivateKey::Ed25519(ed25519_key(6)));
        assert!(matches!(
            resolve_signer(&key),
            Err(VisaError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn test_curve_mismatch_is_unsupported() {
        let key = KeyMaterial::new("ec1", "ES384", PrivateKey::P256(p256_key(7)));
        assert!(matches!(
            resolve_signer(&key),
            Err(VisaError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn test_unknown_algorithm_name_is_unsupported() {
        let key = KeyMaterial::new("ec1", "ES512", PrivateKey::P256(p256_key(8)));
        assert!(matches!(
            resolve_signer(&key),
            Err(VisaError::UnsupportedAlgorithm { .. })
        ));
    }
}
