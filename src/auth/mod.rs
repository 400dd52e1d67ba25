//! Authentication module for the gatekeeper.
//!
//! Three credential schemes, checked in header priority order:
//! - Bearer token (`Authorization`): signed JWT from the identity service
//! - Service token (`x-token`): shared secret for internal callers
//! - API key (`api-key`): AES-encrypted, self-expiring claim set

mod api_key;
mod authenticator;
mod bearer;
pub mod cipher;
mod credential;
mod middleware;
mod permission;

pub use api_key::*;
pub use authenticator::*;
pub use bearer::{
    BearerClaims, BearerError, BearerVerifier, JwtVerifier, TokenPermission, TokenRole, SCOPE_ALL,
};
pub use cipher::CipherError;
pub use credential::*;
pub use middleware::*;
pub use permission::*;
