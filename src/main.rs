//! visa-issuer demo - issue one example visa in every encoding
//!
//! Stands in for the key loader and the output layer:
//! 1. Generates an RSA-2048, a P-256 and an Ed25519 key
//! 2. Issues the example visa as a JWT with each key
//! 3. Transcodes the ES256 token's claims to CBOR and wraps them in COSE_Sign
//! 4. Issues the same visa as a CWT
//! 5. Signs a compact plaintext visa with the RFC 8032 test key
//!
//! Usage: `visa-issuer [config.toml]`

use anyhow::Context;
use log::{info, warn};

use visa_issuer::{
    sign_compact, AssertedBy, Clock, Issuer, IssuerConfig, KeyMaterial, Keyring, PrivateKey,
    SystemClock, SystemRng, Visa,
};

/// Mean Gregorian year in seconds
const YEAR_SECS: i64 = 31_556_952;

/// RFC 8032 section 7.1 TEST 1 seed
const COMPACT_KID: &str = "rfc8032-7.1-test1";
const COMPACT_SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("visa-issuer v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            IssuerConfig::from_toml_str(&source).with_context(|| format!("parsing config {path}"))?
        }
        None => IssuerConfig::default(),
    };

    let mut rng = SystemRng::new()?;
    info!("System RNG initialized");

    let keys = generate_keys(&mut rng)?;
    let issuer = Issuer::new(config);
    let visa = example_visa();

    // One JWT per key
    let mut ec_token = None;
    for key in &keys {
        match issuer.issue_text_token(&visa, key, &mut rng) {
            Ok(token) => {
                info!("visa as JWT: {token}");
                info!("JWT with {} character length: {}", key.family(), token.len());
                if key.kid() == "ec1" {
                    ec_token = Some(token);
                }
            }
            Err(e) => warn!("issuing with {} key {:?} failed: {e}", key.family(), key.kid()),
        }
    }
    let ec_token = ec_token.context("no ES256 token to transcode")?;

    // Binary encodings
    let json_payload = ec_token.claims_json()?;
    info!("JSON payload: {}", String::from_utf8_lossy(&json_payload));
    info!("JSON payload byte length: {}", json_payload.len());

    let cbor_payload = visa_issuer::to_canonical_binary(&json_payload)?;
    info!("CBOR payload: {}", hex::encode(&cbor_payload));
    info!("CBOR payload byte length: {}", cbor_payload.len());

    let envelope = issuer.issue_binary_envelope(&ec_token, &keys, &mut rng)?;
    info!("COSE: {}", hex::encode(envelope.as_bytes()));
    info!("COSE byte length: {}", envelope.len());
    info!("COSE signer kid: {}", hex::encode(envelope.key_id()));

    let cwt = issuer.issue_cwt(&visa, &keys[1], &mut rng)?;
    info!("CWT hex: {}", hex::encode(&cwt));
    info!("CWT byte length: {}", cwt.len());

    // Compact plaintext visa (machine-readable on stdout)
    let keyring = Keyring::new().with(COMPACT_KID, COMPACT_SEED);
    let compact = sign_compact(
        &keyring,
        "c:8XZF4195109CIIERC35P577HAM et:1665130508 \
         iu:https://nagim.dev/p/wjaha-ppqrg-10000 iv:39a277efae72236a",
        COMPACT_KID,
    )?;
    println!("{}", serde_json::to_string_pretty(&compact)?);

    Ok(())
}

/// Demo keys standing in for a loaded JWK set
fn generate_keys(rng: &mut SystemRng) -> anyhow::Result<Vec<KeyMaterial>> {
    let rsa = rsa::RsaPrivateKey::new(rng, 2048).context("generating RSA key")?;
    info!("Demo keys generated");

    Ok(vec![
        KeyMaterial::new("rsa1", "RS256", PrivateKey::Rsa(Box::new(rsa))),
        KeyMaterial::new("ec1", "ES256", PrivateKey::P256(p256::ecdsa::SigningKey::random(rng))),
        KeyMaterial::new(
            "okp1",
            "EdDSA",
            PrivateKey::Ed25519(ed25519_dalek::SigningKey::generate(rng)),
        ),
    ])
}

/// The example visa: accepted terms, asserted now, valid for ten years
fn example_visa() -> Visa {
    let asserted_at = SystemClock.now_secs();
    Visa {
        issuer: "https://login.elixir-czech.org/oidc/".into(),
        subject: "766e0e9deb110dca86b4132485bcfe4daba72db6@elixir-europe.org".into(),
        kind: "AcceptedTermsAndPolicies".into(),
        value: "https://doi.org/10.1038/s41431-018-0219-y".into(),
        source: "https://elixir-europe.org/".into(),
        asserted_by: AssertedBy::SelfAsserted,
        asserted_at,
        expires_at: asserted_at + 10 * YEAR_SECS,
    }
}
