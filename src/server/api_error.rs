//! Standardized API error responses for all licensor endpoints.
//!
//! # Response Format
//!
//! All error responses follow this JSON structure:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "INVALID_SIGNATURE",
//!     "message": "License signature is invalid",
//!     "details": null
//!   }
//! }
//! ```
//!
//! The `details` field is optional and may contain additional context.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::LicenseError;

/// Machine-readable error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // === Token Errors (4xx) ===
    /// Token does not parse into subject and signature
    MalformedToken,
    /// Token signature does not verify
    InvalidSignature,
    /// Subject cannot be bound into a token
    InvalidSubject,

    // === Validation Errors (400) ===
    /// Request payload is invalid or malformed
    InvalidRequest,

    // === Authentication Errors (401/501) ===
    /// No operator token provided
    MissingToken,
    /// Authorization header is malformed
    InvalidHeader,
    /// Operator token is wrong
    InvalidToken,
    /// No operator token is configured on the server
    AuthDisabled,

    // === Server Errors (5xx) ===
    /// Signing key is not loaded on this server
    KeyNotLoaded,
    /// Server configuration error
    ConfigError,
    /// Key or signing operation failed
    CryptoError,
    /// Unexpected internal server error
    InternalError,
}

impl ErrorCode {
    /// Returns the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MalformedToken
            | ErrorCode::InvalidSubject
            | ErrorCode::InvalidRequest
            | ErrorCode::InvalidHeader => StatusCode::BAD_REQUEST,

            ErrorCode::MissingToken | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,

            ErrorCode::InvalidSignature => StatusCode::FORBIDDEN,

            ErrorCode::ConfigError | ErrorCode::CryptoError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ErrorCode::AuthDisabled => StatusCode::NOT_IMPLEMENTED,

            ErrorCode::KeyNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns a default human-readable message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::MalformedToken => "License token is malformed",
            ErrorCode::InvalidSignature => "License signature is invalid",
            ErrorCode::InvalidSubject => "Subject cannot be licensed",
            ErrorCode::InvalidRequest => "Request payload is invalid",
            ErrorCode::MissingToken => "Operator token is required",
            ErrorCode::InvalidHeader => "Authorization header is malformed",
            ErrorCode::InvalidToken => "Operator token is invalid",
            ErrorCode::AuthDisabled => "License issuance is not enabled on this server",
            ErrorCode::KeyNotLoaded => "License signing key is not loaded",
            ErrorCode::ConfigError => "Server configuration error",
            ErrorCode::CryptoError => "Signing operation failed",
            ErrorCode::InternalError => "An unexpected error occurred",
        }
    }
}

/// The inner error object containing code, message, and optional details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Standardized API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

impl ApiError {
    /// Creates a new API error with the default message for `code`.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: code.default_message().to_string(),
                details: None,
            },
        }
    }

    /// Creates a new API error with a custom message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.error.code.status_code()
    }

    /// Creates an `INVALID_REQUEST` error carrying the parse failure.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, message)
    }

    pub fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.error.code.default_message(),
            self.error.message
        )
    }
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

/// JSON request body whose rejections use the standard error envelope.
///
/// Wrong content type, unparseable JSON and missing fields all answer
/// `400 INVALID_REQUEST` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        match err {
            LicenseError::KeyNotLoaded => ApiError::new(ErrorCode::KeyNotLoaded),
            LicenseError::MalformedToken(msg) => {
                ApiError::with_message(ErrorCode::MalformedToken, msg)
            }
            // Never say which part failed to verify.
            LicenseError::InvalidSignature => ApiError::new(ErrorCode::InvalidSignature),
            LicenseError::InvalidSubject(msg) => {
                ApiError::with_message(ErrorCode::InvalidSubject, msg)
            }
            LicenseError::KeyError(_) => ApiError::new(ErrorCode::CryptoError),
            LicenseError::ConfigError(_) => ApiError::new(ErrorCode::ConfigError),
            LicenseError::IoError(_) => ApiError::internal_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(
            ErrorCode::MalformedToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InvalidSignature.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::MissingToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::KeyNotLoaded.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::AuthDisabled.status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn api_error_serialization() {
        let err = ApiError::new(ErrorCode::InvalidSignature);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("INVALID_SIGNATURE"));
        assert!(json.contains("message"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn license_error_conversion() {
        let api_err: ApiError = LicenseError::MalformedToken("missing delimiter".into()).into();
        assert_eq!(api_err.error.code, ErrorCode::MalformedToken);
        assert_eq!(api_err.error.message, "missing delimiter");

        let api_err: ApiError = LicenseError::KeyNotLoaded.into();
        assert_eq!(api_err.error.code, ErrorCode::KeyNotLoaded);
    }

    #[test]
    fn key_errors_hide_internal_detail() {
        let api_err: ApiError =
            LicenseError::KeyError("failed to parse private key: bad asn1".into()).into();
        assert_eq!(api_err.error.code, ErrorCode::CryptoError);
        assert!(!api_err.error.message.contains("asn1"));
    }
}
