//! Error types for the gatekeeper.
//!
//! Every authentication failure maps to exactly one status code and message,
//! and renders as the `{"status", "message"}` body clients already expect.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{BearerError, CipherError};
use crate::session::SessionError;

/// Message shared by every "credential could not be validated" failure.
pub const TOKEN_RETRIEVAL_FAILED: &str = "authorization failed, could not retrieve token";
/// Message for an encrypted API key past its expiry.
pub const TOKEN_EXPIRED: &str = "Your token has expired, please generate a new one";

/// Authentication and authorization failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no recognised credential on request")]
    MissingOrUnknownCredential,

    #[error("service token does not match")]
    InvalidSharedSecret,

    #[error("bearer token rejected: {0}")]
    BearerVerificationFailed(#[from] BearerError),

    #[error("not authorized to {action} {module}")]
    PermissionDenied { module: String, action: String },

    #[error("api key could not be decrypted: {0}")]
    DecryptionFailed(#[from] CipherError),

    #[error("api key payload is malformed: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("api key expired at {expiry}")]
    TokenExpired { expiry: i64 },

    #[error("session unavailable: {0}")]
    SessionUnavailable(SessionError),

    #[error("session could not be saved: {0}")]
    SessionPersistFailed(SessionError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingOrUnknownCredential
            | AuthError::InvalidSharedSecret
            | AuthError::BearerVerificationFailed(_)
            | AuthError::DecryptionFailed(_)
            | AuthError::MalformedPayload(_)
            | AuthError::TokenExpired { .. } => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied { .. } => StatusCode::PRECONDITION_FAILED,
            AuthError::SessionUnavailable(_) | AuthError::SessionPersistFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Never includes credential material.
    pub fn message(&self) -> String {
        match self {
            AuthError::MissingOrUnknownCredential => {
                "authorization failed, missing credential".to_string()
            }
            AuthError::InvalidSharedSecret
            | AuthError::BearerVerificationFailed(_)
            | AuthError::DecryptionFailed(_)
            | AuthError::MalformedPayload(_) => TOKEN_RETRIEVAL_FAILED.to_string(),
            AuthError::TokenExpired { .. } => TOKEN_EXPIRED.to_string(),
            AuthError::PermissionDenied { module, action } => format!(
                "authorization failed. You are not authorized to {} {}",
                action, module
            ),
            AuthError::SessionUnavailable(_) => {
                "authorization failed, session unavailable".to_string()
            }
            AuthError::SessionPersistFailed(_) => {
                "authorization failed, could not persist session".to_string()
            }
        }
    }

    /// Stable machine-readable code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingOrUnknownCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidSharedSecret => "INVALID_SHARED_SECRET",
            AuthError::BearerVerificationFailed(_) => "BEARER_VERIFICATION_FAILED",
            AuthError::PermissionDenied { .. } => "PERMISSION_DENIED",
            AuthError::DecryptionFailed(_) => "DECRYPTION_FAILED",
            AuthError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            AuthError::TokenExpired { .. } => "TOKEN_EXPIRED",
            AuthError::SessionUnavailable(_) => "SESSION_UNAVAILABLE",
            AuthError::SessionPersistFailed(_) => "SESSION_PERSIST_FAILED",
        }
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ResponseMessage {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.code(),
                "Authentication infrastructure failure"
            );
        }

        let body = ResponseMessage {
            status: status.as_u16(),
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidSharedSecret.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired { expiry: 0 }.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::DecryptionFailed(CipherError::CiphertextTooShort).status(),
            StatusCode::UNAUTHORIZED
        );
        let denied = AuthError::PermissionDenied {
            module: "USER".to_string(),
            action: "read".to_string(),
        };
        assert_eq!(denied.status().as_u16(), 412);
        assert_eq!(
            AuthError::SessionPersistFailed(SessionError::Persist("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_absent_and_invalid_collapse_to_same_message() {
        assert_eq!(AuthError::InvalidSharedSecret.message(), TOKEN_RETRIEVAL_FAILED);
        assert_eq!(
            AuthError::DecryptionFailed(CipherError::CiphertextTooShort).message(),
            TOKEN_RETRIEVAL_FAILED
        );
    }

    #[test]
    fn test_session_failures_have_distinct_messages() {
        let unavailable = AuthError::SessionUnavailable(SessionError::Unavailable("x".into()));
        let persist = AuthError::SessionPersistFailed(SessionError::Persist("x".into()));

        assert_ne!(unavailable.message(), persist.message());
        assert!(!unavailable.message().contains("not authorized"));
    }

    #[test]
    fn test_permission_denied_message() {
        let err = AuthError::PermissionDenied {
            module: "SMS".to_string(),
            action: "create".to_string(),
        };
        assert_eq!(
            err.message(),
            "authorization failed. You are not authorized to create SMS"
        );
    }
}
