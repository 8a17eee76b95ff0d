use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::handlers::{
    health_handler, issue_license_handler, verify_license_handler, AppState,
};
use crate::server::logging::request_logging_middleware;

/// Build the application router for the licensor server.
///
/// # Routes
///
/// - `GET /health` - Liveness and key status
/// - `POST /api/v1/licenses` - Issue a license (operator bearer token required)
/// - `POST /api/v1/licenses/verify` - Verify a license token
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/licenses", post(issue_license_handler))
        .route("/api/v1/licenses/verify", post(verify_license_handler))
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}
