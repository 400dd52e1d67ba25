//! Gatekeeper - request authentication service.
//!
//! Serves forward-auth access checks for reverse proxies and exposes the
//! identity bound to the caller's session.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use gatekeeper::api::build_router;
use gatekeeper::auth::{Authenticator, JwtVerifier};
use gatekeeper::config::Config;
use gatekeeper::logging;
use gatekeeper::session::MemorySessionStore;
use gatekeeper::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    let config = Config::load().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    logging::init(&config.logging);

    tracing::info!("Starting Gatekeeper v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        log_format = ?config.logging.format,
        auth = ?config.auth,
        "Configuration loaded"
    );

    if config.auth.allow_anonymous {
        tracing::warn!("Anonymous requests are ALLOWED - disable for production");
    }

    let bearer = JwtVerifier::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.token_duration_hours,
    );
    let sessions = MemorySessionStore::with_limits(
        config.auth.session_cookie.clone(),
        Duration::from_secs(config.auth.session_ttl_secs),
        config.auth.max_sessions,
    );
    let authenticator =
        Authenticator::new(config.auth.clone(), Arc::new(bearer), Arc::new(sessions));

    let app = build_router(AppState {
        authenticator: Arc::new(authenticator),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
