//! License token wire format.
//!
//! A token is the subject followed by a fixed delimiter and the standard
//! (padded) base64 encoding of the RSA-PSS signature over the subject:
//!
//! ```text
//! <subject>::<base64(signature)>
//! ```
//!
//! Parsing splits on the first delimiter only, so subjects containing the
//! delimiter are refused at issuance rather than mis-parsed later.

use std::fmt;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::errors::{LicenseError, LicenseResult};

/// Separator between subject and encoded signature.
pub const DELIMITER: &str = "::";

/// A parsed license token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseToken {
    subject: String,
    signature: Vec<u8>,
}

impl LicenseToken {
    /// Build a token from a subject and raw signature bytes.
    ///
    /// The subject is checked with [`validate_subject`].
    pub fn new(subject: impl Into<String>, signature: Vec<u8>) -> LicenseResult<Self> {
        let subject = subject.into();
        validate_subject(&subject)?;
        Ok(Self { subject, signature })
    }

    /// Parse the wire representation.
    pub fn parse(token: &str) -> LicenseResult<Self> {
        let (subject, encoded) = token
            .split_once(DELIMITER)
            .ok_or_else(|| LicenseError::MalformedToken("missing delimiter".to_string()))?;

        if subject.is_empty() {
            return Err(LicenseError::MalformedToken("empty subject".to_string()));
        }
        if encoded.is_empty() {
            return Err(LicenseError::MalformedToken("empty signature".to_string()));
        }

        let signature = B64
            .decode(encoded)
            .map_err(|e| LicenseError::MalformedToken(format!("signature decode: {e}")))?;

        Ok(Self {
            subject: subject.to_string(),
            signature,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn into_subject(self) -> String {
        self.subject
    }

    /// Encode to the wire representation.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.subject, DELIMITER, B64.encode(&self.signature))
    }
}

impl fmt::Display for LicenseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Check that a subject can be bound into a token.
///
/// Subjects must be non-empty and must not contain [`DELIMITER`].
pub fn validate_subject(subject: &str) -> LicenseResult<()> {
    if subject.is_empty() {
        return Err(LicenseError::InvalidSubject(
            "subject cannot be empty".to_string(),
        ));
    }
    if subject.contains(DELIMITER) {
        return Err(LicenseError::InvalidSubject(format!(
            "subject cannot contain '{DELIMITER}'"
        )));
    }
    Ok(())
}
