//! visa-issuer - GA4GH passport visa issuance
//!
//! A visa is assembled into a claims set once and then signed into:
//! 1. A JWT, with RSA, ECDSA or EdDSA depending on the key supplied
//! 2. A COSE_Sign envelope around the CBOR transcoding of that JWT's claims
//! 3. Optionally a CWT (COSE_Sign1) or a compact plaintext visa
//!
//! Key loading, key publication and verification are left to the caller.
//!
//! ```no_run
//! use visa_issuer::{AssertedBy, Issuer, IssuerConfig, KeyMaterial, PrivateKey, SystemRng, Visa};
//!
//! # fn main() -> visa_issuer::Result<()> {
//! let mut rng = SystemRng::new()?;
//! let key = KeyMaterial::new(
//!     "okp1",
//!     "EdDSA",
//!     PrivateKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut rng)),
//! );
//! let visa = Visa {
//!     issuer: "https://issuer.example/".into(),
//!     subject: "user@example.org".into(),
//!     kind: "AcceptedTermsAndPolicies".into(),
//!     value: "https://example.org/policy".into(),
//!     source: "https://example.org/".into(),
//!     asserted_by: AssertedBy::SelfAsserted,
//!     asserted_at: 1_700_000_000,
//!     expires_at: 2_015_600_000,
//! };
//!
//! let issuer = Issuer::new(IssuerConfig::default());
//! let jwt = issuer.issue_text_token(&visa, &key, &mut rng)?;
//! let cose = issuer.issue_binary_envelope(&jwt, &[key], &mut rng)?;
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod clock;
pub mod compact;
pub mod config;
pub mod cwt;
pub mod entropy;
pub mod envelope;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod key;
pub mod signer;
pub mod transcode;
pub mod visa;

pub use claims::{assemble, VisaClaims, VisaObject, VISA_CLAIM};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compact::{sign_compact, CompactVisa, Keyring};
pub use config::IssuerConfig;
pub use cwt::encode_cwt;
pub use entropy::SystemRng;
pub use envelope::{sign_binary, EnvelopeKey, SignedEnvelope};
pub use error::{Result, VisaError};
pub use issuer::Issuer;
pub use jwt::{encode, Header, SignedTextToken};
pub use key::{Algorithm, KeyFamily, KeyMaterial, PrivateKey};
pub use signer::{resolve_signer, SigningPrimitive};
pub use transcode::{from_canonical_binary, to_canonical_binary};
pub use visa::{AssertedBy, Visa};
