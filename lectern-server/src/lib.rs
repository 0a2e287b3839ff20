//! # Lectern Server
//!
//! HTTP surface for course authoring and study.
//!
//! Instructors build courses out of ordered modules and ordered contents,
//! rearranging them with drag-and-drop order endpoints; students enroll and
//! read courses in that order. The caller is identified by the
//! `X-Actor-Id` header.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use lectern_config::CorsConfig;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

/// Assemble the full application router with middleware applied.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config().cors);

    routes::create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let wildcard = cors.is_wildcard_included();
    let allow_origin = if wildcard {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(infra::actor::ACTOR_HEADER),
        ]);

    // tower-http refuses credentials together with a wildcard origin.
    if cors.allow_credentials && !wildcard {
        layer.allow_credentials(true)
    } else {
        layer
    }
}
