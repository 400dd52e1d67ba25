//! Authorization decision returned to callers.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AuthError, AuthResult};

/// Terminal output of an authentication attempt.
///
/// All three fields are always set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationDecision {
    /// Whether the request may proceed.
    pub authorized: bool,
    /// Human-readable reason; empty on success.
    pub message: String,
    /// HTTP status code to answer with.
    pub status_code: u16,
}

impl AuthorizationDecision {
    pub fn allow() -> Self {
        Self {
            authorized: true,
            message: String::new(),
            status_code: StatusCode::OK.as_u16(),
        }
    }

    pub fn deny(err: &AuthError) -> Self {
        Self {
            authorized: false,
            message: err.message(),
            status_code: err.status().as_u16(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T> From<AuthResult<T>> for AuthorizationDecision {
    fn from(result: AuthResult<T>) -> Self {
        match result {
            Ok(_) => Self::allow(),
            Err(e) => Self::deny(&e),
        }
    }
}
