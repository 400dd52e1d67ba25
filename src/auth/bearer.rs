//! Bearer token verification.
//!
//! The authenticator only sees the [`BearerVerifier`] capability; the signing
//! scheme lives entirely behind it. [`JwtVerifier`] is the HS256 default.

use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ResolvedIdentity;

/// Scope that satisfies any requested scope.
pub const SCOPE_ALL: &str = "all";

/// Reasons a bearer token is rejected.
#[derive(Debug, Error)]
pub enum BearerError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0}s exceeds the configured maximum")]
    LifetimeTooLong(i64),
}

/// A module grant carried in the token's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPermission {
    pub module: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl TokenPermission {
    /// Whether this grant covers `action` on `module` within `scope`.
    pub fn allows(&self, module: &str, action: &str, scope: &str) -> bool {
        self.module == module
            && (self.scope == scope || self.scope == SCOPE_ALL)
            && self.actions.iter().any(|a| a == action)
    }
}

/// Role embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRole {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<TokenPermission>,
}

/// Verified bearer claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerClaims {
    pub user_id: i64,
    #[serde(default)]
    pub client_id: i64,
    pub role: TokenRole,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    #[serde(default)]
    pub iat: i64,
    pub iss: String,
}

impl BearerClaims {
    pub fn identity(&self) -> ResolvedIdentity {
        ResolvedIdentity::new(self.client_id, self.user_id, self.role.id)
    }
}

/// External bearer-token capability.
pub trait BearerVerifier: Send + Sync {
    /// Check signature and expiry, returning the token's claims.
    fn verify(&self, token: &str) -> Result<BearerClaims, BearerError>;

    /// Permission lookup for already-verified claims.
    fn has_permission(&self, claims: &BearerClaims, module: &str, action: &str, scope: &str)
        -> bool;
}

/// HS256 JWT verifier.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    issuer: String,
    /// Maximum accepted `exp - iat`, in hours.
    token_duration_hours: i64,
}

impl JwtVerifier {
    /// Create a verifier for tokens signed with `secret` by `issuer`.
    pub fn new(secret: &str, issuer: String, token_duration_hours: i64) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            token_duration_hours,
        }
    }
}

impl BearerVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<BearerClaims, BearerError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data: TokenData<BearerClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                e
            })?;

        let claims = token_data.claims;
        let lifetime = claims.exp - claims.iat;
        if claims.iat > 0 && lifetime > self.token_duration_hours.saturating_mul(3600) {
            return Err(BearerError::LifetimeTooLong(lifetime));
        }

        Ok(claims)
    }

    fn has_permission(
        &self,
        claims: &BearerClaims,
        module: &str,
        action: &str,
        scope: &str,
    ) -> bool {
        claims
            .role
            .permissions
            .iter()
            .any(|p| p.allows(module, action, scope))
    }
}
