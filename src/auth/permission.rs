//! Permission gate.
//!
//! One policy for every scheme: the (`self`, `auth`) pair is always exempt,
//! otherwise the grants carried by the credential must cover the request.

use crate::auth::api_key::ApiKeyPayload;
use crate::auth::bearer::{BearerClaims, BearerVerifier, SCOPE_ALL};
use crate::error::{AuthError, AuthResult};

/// Module name for requests about the caller itself.
pub const SELF_MODULE: &str = "self";
/// Action name for plain "am I authenticated" checks.
pub const AUTH_ACTION: &str = "auth";

/// Authorization claims resolved from a credential.
pub enum Grants<'a> {
    /// Trusted service caller; no per-module checks.
    Unrestricted,
    /// Bearer claims, checked through the verifier's permission lookup.
    Bearer {
        verifier: &'a dyn BearerVerifier,
        claims: &'a BearerClaims,
    },
    /// Flat module list carried by an encrypted API key.
    ApiKey(&'a ApiKeyPayload),
}

/// Whether the request is exempt from permission checks.
pub fn is_exempt(module: &str, action: &str) -> bool {
    module == SELF_MODULE && action == AUTH_ACTION
}

/// Decide whether `grants` allow `action` on `module`.
pub fn check_permission(grants: &Grants<'_>, module: &str, action: &str) -> AuthResult<()> {
    if is_exempt(module, action) {
        return Ok(());
    }

    let allowed = match grants {
        Grants::Unrestricted => true,
        Grants::Bearer { verifier, claims } => {
            verifier.has_permission(claims, module, action, SCOPE_ALL)
        }
        Grants::ApiKey(payload) => payload.grants_module(module),
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied {
            module: module.to_string(),
            action: action.to_string(),
        })
    }
}
