//! Shared RSA keys for unit tests, generated once per test binary.

use std::sync::OnceLock;

use rsa::RsaPrivateKey;

use crate::keys::{generate_private_key, DEFAULT_KEY_BITS};

static PRIMARY: OnceLock<RsaPrivateKey> = OnceLock::new();
static SECONDARY: OnceLock<RsaPrivateKey> = OnceLock::new();

pub fn primary() -> &'static RsaPrivateKey {
    PRIMARY.get_or_init(|| generate_private_key(DEFAULT_KEY_BITS).expect("keygen"))
}

pub fn secondary() -> &'static RsaPrivateKey {
    SECONDARY.get_or_init(|| generate_private_key(DEFAULT_KEY_BITS).expect("keygen"))
}
