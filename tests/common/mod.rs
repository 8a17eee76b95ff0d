//! Shared test helpers for licensor integration tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use licensor::keys::{generate_private_key, parse_private_key_pem, DEFAULT_KEY_BITS};
use licensor::signer::LicenseSigner;
use rsa::RsaPrivateKey;

pub const FIXTURE_PRIVATE_PEM: &str = include_str!("../fixtures/issuer_private.pem");
pub const FIXTURE_PUBLIC_PEM: &str = include_str!("../fixtures/issuer_public.pem");

/// Tokens signed by the previous issuer with the fixture key, one per line.
pub const FIXTURE_TOKENS: &str = include_str!("../fixtures/issued_tokens.txt");

static GENERATED: OnceLock<RsaPrivateKey> = OnceLock::new();

/// PKCS#1 fixture key shared with the previous issuer.
pub fn fixture_key() -> RsaPrivateKey {
    parse_private_key_pem(FIXTURE_PRIVATE_PEM).expect("fixture key parses")
}

/// A freshly generated key, distinct from the fixture key.
pub fn generated_key() -> &'static RsaPrivateKey {
    GENERATED.get_or_init(|| generate_private_key(DEFAULT_KEY_BITS).expect("keygen"))
}

pub fn fixture_signer() -> LicenseSigner {
    LicenseSigner::new(fixture_key())
}

pub fn generated_signer() -> LicenseSigner {
    LicenseSigner::new(generated_key().clone())
}

pub fn fixture_tokens() -> Vec<&'static str> {
    FIXTURE_TOKENS.lines().filter(|l| !l.is_empty()).collect()
}
