//! Operator authentication for the issuance endpoint.
//!
//! Issuing a license is the "approval" step: only an operator holding the
//! configured bearer token may call it. Verification is public.
//!
//! ```rust,ignore
//! async fn issue_handler(_operator: Operator, ...) -> ... { ... }
//! ```
//!
//! The configured token is stored as a SHA-256 digest and presented tokens
//! are hashed before comparison, so comparison time does not depend on how
//! many leading characters of the secret were guessed.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::AdminConfig;
use crate::server::api_error::{ApiError, ErrorCode};
use crate::server::handlers::AppState;

/// Authentication errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Missing Authorization header
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader,
    /// Token does not match
    InvalidToken,
    /// No operator token configured
    AuthDisabled,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "missing authorization token"),
            AuthError::InvalidHeader => write!(f, "invalid authorization header format"),
            AuthError::InvalidToken => write!(f, "invalid operator token"),
            AuthError::AuthDisabled => write!(f, "license issuance is not enabled"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::MissingToken => ErrorCode::MissingToken,
            AuthError::InvalidHeader => ErrorCode::InvalidHeader,
            AuthError::InvalidToken => ErrorCode::InvalidToken,
            AuthError::AuthDisabled => ErrorCode::AuthDisabled,
        };
        ApiError::new(code)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Operator credential check held in application state.
#[derive(Clone, Default)]
pub struct OperatorAuth {
    token_digest: Option<[u8; 32]>,
}

impl OperatorAuth {
    /// Create from configuration. An empty token disables issuance over HTTP.
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::from_token(&config.api_token)
    }

    pub fn from_token(token: &str) -> Self {
        if token.is_empty() {
            return Self::disabled();
        }
        Self {
            token_digest: Some(Sha256::digest(token.as_bytes()).into()),
        }
    }

    pub fn disabled() -> Self {
        Self { token_digest: None }
    }

    pub fn enabled(&self) -> bool {
        self.token_digest.is_some()
    }

    /// Check the value of an `Authorization` header.
    pub fn check_header(&self, header: Option<&str>) -> Result<(), AuthError> {
        let expected = self.token_digest.as_ref().ok_or(AuthError::AuthDisabled)?;
        let header = header.ok_or(AuthError::MissingToken)?;
        let presented = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidHeader)?;

        let digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        if &digest == expected {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

impl std::fmt::Debug for OperatorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorAuth")
            .field("enabled", &self.enabled())
            .finish()
    }
}

/// Extractor proving the request carries the operator token.
#[derive(Debug, Clone, Copy)]
pub struct Operator;

#[async_trait]
impl FromRequestParts<AppState> for Operator {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::InvalidHeader)?),
            None => None,
        };

        state.operator_auth.check_header(header).map_err(|e| {
            if e == AuthError::InvalidToken {
                warn!("Rejected issuance request with wrong operator token");
            }
            e
        })?;

        Ok(Operator)
    }
}
