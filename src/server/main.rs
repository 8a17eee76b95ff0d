use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use licensor::config::init_config;
use licensor::errors::{LicenseError, LicenseResult};
use licensor::keys::load_authority;
use licensor::logging::init_logging;
use licensor::server::{build_router, AppState, OperatorAuth};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(kind = e.kind(), "licensor server failed: {e}");
        eprintln!("licensor server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> LicenseResult<()> {
    let config = init_config()?;
    init_logging(&config.logging);

    // Fails here, not on the first issuance, when the key is missing.
    let authority = load_authority(&config.keys)?;
    let operator_auth = OperatorAuth::from_config(&config.admin);
    if authority.can_sign() && !operator_auth.enabled() {
        warn!("admin.api_token is empty; HTTP issuance is disabled");
    }

    let state = AppState::new(authority, operator_auth)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| LicenseError::ConfigError(format!("invalid server address: {e}")))?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
