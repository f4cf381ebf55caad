//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP handlers (one file per area)
//! - `dto.rs`: request DTOs and body extraction
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{http::HeaderValue, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &Config) -> Result<Router, classroll_infra::StoreError> {
    let services = AppServices::from_config(config).await?;
    Ok(router(Arc::new(services), config))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>, config: &Config) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
        clock: services.clock.clone(),
    };

    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origin)),
        )
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin, "CORS_ORIGIN is not a valid header value; cross-origin requests disabled");
            layer
        }
    }
}
