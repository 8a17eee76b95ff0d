//! Error types for license issuance and verification.

use thiserror::Error;

/// Errors that can occur during license operations.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Signing was requested but no private key is configured.
    #[error("signing key not loaded")]
    KeyNotLoaded,

    /// Token does not parse into subject and signature.
    #[error("malformed license token: {0}")]
    MalformedToken(String),

    /// Well-formed token whose signature does not verify.
    #[error("invalid license signature")]
    InvalidSignature,

    /// Subject cannot be bound into a token.
    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    /// Key material could not be parsed, generated or encoded.
    #[error("key error: {0}")]
    KeyError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LicenseError {
    /// Stable identifier for audit logs and CLI exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LicenseError::KeyNotLoaded => "key_not_loaded",
            LicenseError::MalformedToken(_) => "malformed_token",
            LicenseError::InvalidSignature => "invalid_signature",
            LicenseError::InvalidSubject(_) => "invalid_subject",
            LicenseError::KeyError(_) => "key_error",
            LicenseError::ConfigError(_) => "config_error",
            LicenseError::IoError(_) => "io_error",
        }
    }

    /// True when the error means a presented token must be rejected.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LicenseError::MalformedToken(_) | LicenseError::InvalidSignature
        )
    }
}

pub type LicenseResult<T> = Result<T, LicenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            LicenseError::KeyNotLoaded,
            LicenseError::MalformedToken("x".into()),
            LicenseError::InvalidSignature,
            LicenseError::InvalidSubject("x".into()),
            LicenseError::KeyError("x".into()),
            LicenseError::ConfigError("x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn only_token_failures_are_rejections() {
        assert!(LicenseError::InvalidSignature.is_rejection());
        assert!(LicenseError::MalformedToken("no delimiter".into()).is_rejection());
        assert!(!LicenseError::KeyNotLoaded.is_rejection());
        assert!(!LicenseError::InvalidSubject("empty".into()).is_rejection());
    }

    #[test]
    fn invalid_signature_message_carries_no_detail() {
        assert_eq!(
            LicenseError::InvalidSignature.to_string(),
            "invalid license signature"
        );
    }
}
