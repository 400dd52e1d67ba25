//! Route definitions for the API.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::auth::{require_permission, Authenticator, PermissionGuard, AUTH_ACTION, SELF_MODULE};
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "service_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-token"))),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("api-key"))),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::check_access,
        handlers::current_identity,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::AccessCheckQuery,
        crate::api::types::HealthResponse,
        crate::domain::AuthorizationDecision,
        crate::domain::ResolvedIdentity,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and access checks"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Gatekeeper API",
        version = "0.1.0",
        description = "Resolves request credentials into session identities",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes requiring any authenticated caller
    let self_routes = Router::new()
        .route("/v1/auth/me", get(handlers::current_identity))
        .route_layer(middleware::from_fn_with_state(
            guard(&state.authenticator, SELF_MODULE, AUTH_ACTION),
            require_permission,
        ));

    // Public routes (the check endpoint authenticates on its own)
    let public_routes = Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/auth/check", get(handlers::check_access))
        .with_state(state);

    Router::new()
        .merge(self_routes)
        .merge(public_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn guard(
    authenticator: &Arc<Authenticator>,
    module: &'static str,
    action: &'static str,
) -> PermissionGuard {
    PermissionGuard::new(authenticator.clone(), module, action)
}
