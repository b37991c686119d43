use crate::{
    controller::{health_check_controller, message_controller, poll_controller},
    AppState,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Bro Relay API"
        ),
        paths(
            health_check_controller::health_check,
            message_controller::publish,
            poll_controller::poll,
        ),
        components(
            schemas(
                relay::Message,
            )
        ),
        tags(
            (name = "bro", description = "Real-time broadcast relay")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(message_routes(app_state.clone()))
        .merge(poll_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn message_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/v1/bro", post(message_controller::publish))
        .layer(cors_layer(&app_state.config))
        .with_state(app_state)
}

fn poll_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/v1/poll/{id}", get(poll_controller::poll))
        .with_state(app_state)
}

// Browsers publishing JSON need a preflight answer for POST /v1/bro
fn cors_layer(config: &Config) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!("Ignoring invalid allowed origin {origin}: {e}"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
