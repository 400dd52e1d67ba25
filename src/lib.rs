//! Gatekeeper - request authentication for internal HTTP services.
//!
//! Determines which credential scheme a request presents (bearer token,
//! service secret or encrypted API key), validates it, checks the requested
//! module/action permission and binds the resolved identity to the session.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod session;

use crate::auth::Authenticator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolves credentials into session identities.
    pub authenticator: Arc<Authenticator>,
}
