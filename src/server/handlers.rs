use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::LicenseResult;
use crate::keys::key_fingerprint;
use crate::logging::{log_license_event, log_rejection, LicenseEvent};
use crate::server::api_error::{ApiError, ApiJson};
use crate::server::auth::{Operator, OperatorAuth};
use crate::server::logging::HealthResponse;
use crate::signer::LicenseAuthority;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<LicenseAuthority>,
    pub operator_auth: OperatorAuth,
    /// Fingerprint of the verification key, computed once at startup
    pub key_fingerprint: Arc<str>,
}

impl AppState {
    pub fn new(authority: LicenseAuthority, operator_auth: OperatorAuth) -> LicenseResult<Self> {
        let fingerprint = key_fingerprint(authority.verifier().public_key())?;
        Ok(Self {
            authority: Arc::new(authority),
            operator_auth,
            key_fingerprint: fingerprint.into(),
        })
    }
}

/// Request body for issuing a license.
#[derive(Debug, Deserialize, Serialize)]
pub struct IssueRequest {
    pub subject: String,
}

/// Response body for an issued license.
#[derive(Debug, Deserialize, Serialize)]
pub struct IssueResponse {
    pub subject: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

/// Request body for verifying a license.
#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Response body for a verified license.
#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub subject: String,
}

/// Issue a license token for an approved subject.
///
/// Requires the operator bearer token. Signing is CPU-bound, so it runs on
/// the blocking pool.
pub async fn issue_license_handler(
    _operator: Operator,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<IssueRequest>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let authority = Arc::clone(&state.authority);
    let subject = payload.subject;

    let token = {
        let subject = subject.clone();
        tokio::task::spawn_blocking(move || authority.issue(&subject))
            .await
            .map_err(|_| ApiError::internal_error())?
    };

    let token = match token {
        Ok(token) => token,
        Err(e) => {
            log_license_event(LicenseEvent::IssueFailed, Some(&subject), Some(e.kind()));
            return Err(e.into());
        }
    };

    log_license_event(LicenseEvent::Issued, Some(&subject), None);

    Ok((
        StatusCode::CREATED,
        Json(IssueResponse {
            subject,
            token,
            issued_at: Utc::now(),
        }),
    ))
}

/// Verify a license token and return its subject.
pub async fn verify_license_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let authority = Arc::clone(&state.authority);
    let result = tokio::task::spawn_blocking(move || authority.verify(&payload.token))
        .await
        .map_err(|_| ApiError::internal_error())?;

    match result {
        Ok(subject) => {
            log_license_event(LicenseEvent::Verified, Some(&subject), None);
            Ok(Json(VerifyResponse {
                valid: true,
                subject,
            }))
        }
        Err(e) => {
            log_rejection(&e);
            Err(e.into())
        }
    }
}

/// Liveness and key status.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.authority.can_sign(),
        &state.key_fingerprint,
    ))
}
