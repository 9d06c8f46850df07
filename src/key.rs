//! Key material supplied by the key loader
//!
//! The issuer never creates, rotates or inspects keys beyond picking the
//! signing primitive for them. A [`KeyMaterial`] is handed in, borrowed for
//! the duration of one signature, and handed back untouched.

use core::fmt;

use zeroize::Zeroizing;

/// JWK key type (`kty`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Rsa,
    Ec,
    /// Octet key pair (Ed25519)
    Okp,
    /// Symmetric octet sequence; never signable by this issuer
    Oct,
}

impl KeyFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Okp => "OKP",
            Self::Oct => "oct",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWS signature algorithms this issuer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Rs256,
    Rs384,
    Rs512,
    Ps256,
    Ps384,
    Ps512,
    Es256,
    Es384,
    EdDsa,
}

impl Algorithm {
    /// The registered JOSE name, as it appears in the `alg` header
    pub fn name(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::EdDsa => "EdDSA",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "RS256" => Self::Rs256,
            "RS384" => Self::Rs384,
            "RS512" => Self::Rs512,
            "PS256" => Self::Ps256,
            "PS384" => Self::Ps384,
            "PS512" => Self::Ps512,
            "ES256" => Self::Es256,
            "ES384" => Self::Es384,
            "EdDSA" => Self::EdDsa,
            _ => return None,
        })
    }

    /// The only key family that may sign with this algorithm
    pub fn family(self) -> KeyFamily {
        match self {
            Self::Rs256 | Self::Rs384 | Self::Rs512 | Self::Ps256 | Self::Ps384 | Self::Ps512 => {
                KeyFamily::Rsa
            }
            Self::Es256 | Self::Es384 => KeyFamily::Ec,
            Self::EdDsa => KeyFamily::Okp,
        }
    }

    /// The matching COSE algorithm identifier
    pub fn cose(self) -> coset::iana::Algorithm {
        use coset::iana::Algorithm as Cose;
        match self {
            Self::Rs256 => Cose::RS256,
            Self::Rs384 => Cose::RS384,
            Self::Rs512 => Cose::RS512,
            Self::Ps256 => Cose::PS256,
            Self::Ps384 => Cose::PS384,
            Self::Ps512 => Cose::PS512,
            Self::Es256 => Cose::ES256,
            Self::Es384 => Cose::ES384,
            Self::EdDsa => Cose::EdDSA,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A private key, tagged by family and curve
pub enum PrivateKey {
    Rsa(Box<rsa::RsaPrivateKey>),
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
    /// Raw symmetric secret, e.g. an HMAC key from a mixed JWK set
    Oct(Zeroizing<Vec<u8>>),
}

impl PrivateKey {
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::P256(_) | Self::P384(_) => KeyFamily::Ec,
            Self::Ed25519(_) => KeyFamily::Okp,
            Self::Oct(_) => KeyFamily::Oct,
        }
    }
}

/// One signing key with its identifier and declared algorithm
pub struct KeyMaterial {
    kid: String,
    alg: String,
    key: PrivateKey,
}

impl KeyMaterial {
    /// Wrap a loaded key
    ///
    /// `alg` is kept as given; whether it fits the key is decided when a
    /// signer is resolved for it.
    pub fn new(kid: impl Into<String>, alg: impl Into<String>, key: PrivateKey) -> Self {
        Self {
            kid: kid.into(),
            alg: alg.into(),
            key,
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Declared algorithm name (JWK `alg`)
    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn family(&self) -> KeyFamily {
        self.key.family()
    }

    pub(crate) fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    /// The P-256 signing key, if this is one
    pub(crate) fn p256(&self) -> Option<&p256::ecdsa::SigningKey> {
        match &self.key {
            PrivateKey::P256(key) => Some(key),
            _ => None,
        }
    }
}

// Private key material never goes to logs
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("family", &self.family())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Algorithm; 9] = [
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Ps256,
        Algorithm::Ps384,
        Algorithm::Ps512,
        Algorithm::Es256,
        Algorithm::Es384,
        Algorithm::EdDsa,
    ];

    #[test]
    fn test_algorithm_names_round_trip() {
        for alg in ALL {
            assert_eq!(Algorithm::from_name(alg.name()), Some(alg));
        }
        assert_eq!(Algorithm::from_name("HS256"), None);
        assert_eq!(Algorithm::from_name("es256"), None);
    }

    #[test]
    fn test_algorithm_families() {
        assert_eq!(Algorithm::Ps384.family(), KeyFamily::Rsa);
        assert_eq!(Algorithm::Es384.family(), KeyFamily::Ec);
        assert_eq!(Algorithm::EdDsa.family(), KeyFamily::Okp);
    }

    #[test]
    fn test_debug_hides_key() {
        let key =
            KeyMaterial::new("secret", "HS256", PrivateKey::Oct(Zeroizing::new(vec![0xAA; 32])));
        let rendered = format!("{key:?}");
        assert!(rendered.contains("secret"));
        assert!(rendered.contains("Oct"));
        assert!(!rendered.contains("170"));
    }
}
