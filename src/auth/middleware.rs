//! Authentication middleware for axum.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::auth::Authenticator;
use crate::error::AuthError;
use crate::session::identity_of;

/// Middleware state: the module/action a route requires.
#[derive(Clone)]
pub struct PermissionGuard {
    authenticator: Arc<Authenticator>,
    module: &'static str,
    action: &'static str,
}

impl PermissionGuard {
    pub fn new(
        authenticator: Arc<Authenticator>,
        module: &'static str,
        action: &'static str,
    ) -> Self {
        Self {
            authenticator,
            module,
            action,
        }
    }
}

/// Authenticate the request before it reaches the handler.
///
/// On success the resolved identity is available to handlers through
/// request extensions, and new sessions are handed to the client as a cookie.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let session = guard
        .authenticator
        .authorize(request.headers(), guard.module, guard.action)?;

    if let Some(identity) = identity_of(&session) {
        request.extensions_mut().insert(identity);
    }

    let mut response = next.run(request).await;

    if let Some(cookie) = guard.authenticator.sessions().cookie_header(&session) {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Session cookie is not a valid header value"),
        }
    }

    Ok(response)
}
