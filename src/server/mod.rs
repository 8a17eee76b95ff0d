// src/server/mod.rs

//! HTTP surface for licensor.
//!
//! This module contains:
//! - `handlers`   → Axum handlers for issuing and verifying licenses
//! - `routes`     → Router builder
//! - `auth`       → Operator bearer-token check for issuance
//! - `api_error`  → JSON error envelope
//! - `logging`    → Request logging middleware and health payload

pub mod api_error;
pub mod auth;
pub mod handlers;
pub mod logging;
pub mod routes;

pub use api_error::{ApiError, ApiJson, ErrorCode};
pub use auth::{AuthError, Operator, OperatorAuth};
pub use handlers::{
    health_handler, issue_license_handler, verify_license_handler, AppState, IssueRequest,
    IssueResponse, VerifyRequest, VerifyResponse,
};
pub use routes::build_router;
