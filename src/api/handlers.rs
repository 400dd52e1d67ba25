//! HTTP request handlers.

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::api::types::*;
use crate::domain::{AuthorizationDecision, ResolvedIdentity};
use crate::AppState;

/// Decide whether the caller may perform `action` on `module`.
///
/// GET /v1/auth/check
///
/// Meant for reverse proxies doing forward authentication: the response
/// status mirrors the decision.
#[utoipa::path(
    get,
    path = "/v1/auth/check",
    params(AccessCheckQuery),
    responses(
        (status = 200, description = "Authorized", body = AuthorizationDecision),
        (
            status = 401,
            description = "Missing, invalid or expired credential",
            body = AuthorizationDecision
        ),
        (
            status = 412,
            description = "Credential lacks the permission",
            body = AuthorizationDecision
        ),
        (status = 500, description = "Session store failure", body = AuthorizationDecision)
    ),
    security(("bearer_auth" = []), ("service_token" = []), ("api_key" = [])),
    tag = "auth"
)]
pub async fn check_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AccessCheckQuery>,
) -> Response {
    let (decision, cookie) = match state
        .authenticator
        .authorize(&headers, &query.module, &query.action)
    {
        Ok(session) => (
            AuthorizationDecision::allow(),
            state.authenticator.sessions().cookie_header(&session),
        ),
        Err(e) => (AuthorizationDecision::deny(&e), None),
    };

    let mut response = (decision.status(), Json(decision)).into_response();
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// Identity bound to the caller's session.
///
/// GET /v1/auth/me
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current identity", body = ResolvedIdentity),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []), ("service_token" = []), ("api_key" = [])),
    tag = "auth"
)]
pub async fn current_identity(
    Extension(identity): Extension<ResolvedIdentity>,
) -> Json<ResolvedIdentity> {
    Json(identity)
}

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
