use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::middleware::auth::identity_middleware;

pub mod extract;
pub mod health;
pub mod review;

/// Registers the `bearerAuth` scheme referenced by secured paths.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.clone().unwrap_or(Components::default());
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        openapi.components = Some(components);
    }
}

/// Full application router: review endpoints behind the identity layer,
/// health checks and Swagger UI outside it.
pub fn router(state: AppState) -> Router {
    let review_routes = review::review_routes()
        .route_layer(from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .merge(health::health_routes())
        .merge(review_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", review::ReviewDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
