//! licensor - RSA-PSS signed license tokens
//!
//! A license token binds a subject (a user id or email) to an RSA-PSS
//! signature and travels as a single string:
//!
//! ```text
//! <subject>::<base64(signature)>
//! ```
//!
//! Tokens carry no expiry or scope; a valid signature is the whole license.
//!
//! # Features
//!
//! - `server` - HTTP issuance and verification service. Enabled by default.
//!
//! # Example
//!
//! ```rust,ignore
//! use licensor::keys::generate_private_key;
//! use licensor::signer::LicenseSigner;
//!
//! let signer = LicenseSigner::new(generate_private_key(2048)?);
//! let token = signer.issue("12345")?;
//! assert_eq!(signer.verifier().verify(&token)?, "12345");
//! ```

pub mod commands;
pub mod config;
pub mod errors;
pub mod keys;
pub mod logging;
pub mod signer;
pub mod token;

#[cfg(test)]
mod test_keys;

#[cfg(feature = "server")]
#[path = "server/mod.rs"]
pub mod server;

pub use errors::{LicenseError, LicenseResult};
pub use signer::{LicenseAuthority, LicenseSigner, LicenseVerifier};
pub use token::LicenseToken;
