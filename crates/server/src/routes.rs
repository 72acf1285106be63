pub mod admin;
pub mod auth;
pub mod visits;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, token-protected and docs routes
pub fn build_router(cors: CorsLayer, state: auth::ServerState) -> Router {
    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    // Token-protected routes
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/solicitudes", get(visits::list).post(visits::create))
        .route(
            "/solicitudes/:id",
            get(visits::get).put(visits::update).patch(visits::partial_update),
        )
        .route("/solicitudes/:id/aceptar-servicio", post(visits::accept))
        .route("/solicitudes/:id/confirmar-visita", post(visits::confirm))
        .route("/solicitudes/:id/asignar-jardinero-admin", patch(visits::assign_by_admin))
        .route("/admin/accounts/:id", delete(admin::delete_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ));

    // Compose
    public
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
