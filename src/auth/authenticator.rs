//! Multi-scheme request authentication.
//!
//! Pipeline order:
//! 1. Credential extraction by header priority
//! 2. Per-scheme validation and claim resolution
//! 3. Permission gate
//! 4. Session binding
//!
//! The first failing stage short-circuits with its own error.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::auth::api_key::ApiKeyPayload;
use crate::auth::bearer::BearerVerifier;
use crate::auth::credential::{
    header_value, redact, Credential, CLIENT_ID_HEADER, USER_ID_HEADER,
};
use crate::auth::permission::{check_permission, Grants};
use crate::config::AuthConfig;
use crate::domain::{AuthorizationDecision, ResolvedIdentity};
use crate::error::{AuthError, AuthResult};
use crate::session::{self, Session, SessionStore};

/// Resolves credentials into session identities.
#[derive(Clone)]
pub struct Authenticator {
    config: Arc<AuthConfig>,
    bearer: Arc<dyn BearerVerifier>,
    sessions: Arc<dyn SessionStore>,
}

impl Authenticator {
    /// Create an authenticator with the given secrets and capabilities.
    pub fn new(
        config: AuthConfig,
        bearer: Arc<dyn BearerVerifier>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            bearer,
            sessions,
        }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    /// Authenticate a request for `action` on `module`.
    ///
    /// Writes the resolved identity to the session on success only.
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> AuthorizationDecision {
        self.authorize(headers, module, action).into()
    }

    /// Like [`Authenticator::authenticate`], but returns the bound session.
    pub fn authorize(
        &self,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> AuthResult<Session> {
        let identity = self.resolve(headers, module, action)?;
        session::bind(self.sessions.as_ref(), headers, identity)
    }

    /// Validate the request credential and apply the permission gate.
    ///
    /// No side effects.
    pub fn resolve(
        &self,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> AuthResult<ResolvedIdentity> {
        let credential = Credential::extract(headers);

        let result = match &credential {
            Credential::ServiceSharedSecret(token) => {
                self.resolve_service(token, headers, module, action)
            }
            Credential::BearerToken(token) => self.resolve_bearer(token, module, action),
            Credential::EncryptedApiKey(token) => self.resolve_api_key(token, module, action),
            Credential::Unknown => self.resolve_unknown(),
        };

        match &result {
            Ok(identity) => tracing::debug!(
                scheme = %credential.scheme(),
                client_id = identity.client_id,
                user_id = identity.user_id,
                role_id = identity.role_id,
                module,
                action,
                "Request authenticated"
            ),
            Err(e) => tracing::info!(
                scheme = %credential.scheme(),
                code = e.code(),
                module,
                action,
                "Request rejected"
            ),
        }

        result
    }

    fn resolve_service(
        &self,
        token: &str,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> AuthResult<ResolvedIdentity> {
        if !secrets_match(token, &self.config.service_token) {
            tracing::warn!(key_prefix = %redact(token), "Invalid service token attempted");
            return Err(AuthError::InvalidSharedSecret);
        }

        let mut identity = ResolvedIdentity::SERVICE;

        if let Some(client_id) = numeric_header(headers, CLIENT_ID_HEADER) {
            identity.client_id = client_id;
        }

        if let Some(user_id) = numeric_header(headers, USER_ID_HEADER).filter(|id| *id > 0) {
            identity.user_id = user_id;
        }

        check_permission(&Grants::Unrestricted, module, action)?;
        Ok(identity)
    }

    fn resolve_bearer(
        &self,
        token: &str,
        module: &str,
        action: &str,
    ) -> AuthResult<ResolvedIdentity> {
        let claims = self.bearer.verify(token).map_err(|e| {
            tracing::warn!(error = %e, "Could not decode bearer token");
            e
        })?;

        let grants = Grants::Bearer {
            verifier: self.bearer.as_ref(),
            claims: &claims,
        };
        check_permission(&grants, module, action).map_err(|e| {
            tracing::info!(
                user_id = claims.user_id,
                module,
                action,
                "Bearer token lacks permission"
            );
            e
        })?;

        Ok(claims.identity())
    }

    fn resolve_api_key(
        &self,
        token: &str,
        module: &str,
        action: &str,
    ) -> AuthResult<ResolvedIdentity> {
        let payload = ApiKeyPayload::open(&self.config.api_encryption_key, token).map_err(|e| {
            tracing::warn!(error = %e, "Could not decode api key");
            e
        })?;

        payload.check_expiry(Utc::now().timestamp())?;
        check_permission(&Grants::ApiKey(&payload), module, action)?;

        Ok(payload.identity())
    }

    fn resolve_unknown(&self) -> AuthResult<ResolvedIdentity> {
        if self.config.allow_anonymous {
            return Ok(ResolvedIdentity::ANONYMOUS);
        }
        Err(AuthError::MissingOrUnknownCredential)
    }
}

/// Compare secrets via their digests so timing does not track the common prefix.
fn secrets_match(presented: &str, expected: &str) -> bool {
    !expected.is_empty()
        && Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Header parsed as an integer; missing or non-numeric values yield `None`.
fn numeric_header(headers: &HeaderMap, name: &str) -> Option<i64> {
    header_value(headers, name).and_then(|v| v.trim().parse().ok())
}
