//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api::handlers::{actions, health, resources},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_request_body_size;

    Router::new()
        .route("/health", get(health::health))
        // Actions must be registered before the generic :resource_type routes
        // only for readability; the router matches static segments first.
        .route("/api/tasks/:id/execute", post(actions::execute_task))
        .route("/api/charges/:id/validate", post(actions::validate_charge))
        .route(
            "/api/:resource_type",
            get(resources::list).post(resources::create),
        )
        .route(
            "/api/:resource_type/:id",
            get(resources::get)
                .put(resources::replace)
                .delete(resources::delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    cors.allow_origin(parsed)
}
