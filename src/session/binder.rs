//! Writes a resolved identity into the request session.

use axum::http::HeaderMap;

use crate::domain::ResolvedIdentity;
use crate::error::{AuthError, AuthResult};
use crate::session::{Session, SessionStore};

pub const CLIENT_ID_KEY: &str = "client_id";
pub const USER_ID_KEY: &str = "user_id";
pub const ROLE_ID_KEY: &str = "role_id";

/// Bind `identity` to the session of the request carrying `headers`.
pub fn bind(
    store: &dyn SessionStore,
    headers: &HeaderMap,
    identity: ResolvedIdentity,
) -> AuthResult<Session> {
    let mut session = store.get(headers).map_err(|e| {
        tracing::error!(error = %e, "Session bag error");
        AuthError::SessionUnavailable(e)
    })?;

    session.insert(CLIENT_ID_KEY, identity.client_id);
    session.insert(USER_ID_KEY, identity.user_id);
    session.insert(ROLE_ID_KEY, identity.role_id);

    store.save(&session).map_err(|e| {
        tracing::error!(error = %e, session_id = %session.id(), "Error saving session");
        AuthError::SessionPersistFailed(e)
    })?;

    Ok(session)
}

/// Read a previously bound identity back out of a session.
pub fn identity_of(session: &Session) -> Option<ResolvedIdentity> {
    Some(ResolvedIdentity::new(
        session.get(CLIENT_ID_KEY)?,
        session.get(USER_ID_KEY)?,
        session.get(ROLE_ID_KEY)?,
    ))
}
