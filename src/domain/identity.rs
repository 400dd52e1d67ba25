//! Resolved caller identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity resolved from a validated credential.
///
/// Written once into the request session; later handlers read it back from
/// request extensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedIdentity {
    /// Tenant/client the caller acts for.
    pub client_id: i64,
    /// Authenticated user.
    pub user_id: i64,
    /// Role of the user.
    pub role_id: i64,
}

impl ResolvedIdentity {
    /// Privileged identity used by service-to-service callers.
    pub const SERVICE: Self = Self {
        client_id: 0,
        user_id: 1,
        role_id: 1,
    };

    /// Zero-valued identity for requests carrying no credential.
    pub const ANONYMOUS: Self = Self {
        client_id: 0,
        user_id: 0,
        role_id: 0,
    };

    pub fn new(client_id: i64, user_id: i64, role_id: i64) -> Self {
        Self {
            client_id,
            user_id,
            role_id,
        }
    }
}
