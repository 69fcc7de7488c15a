//! Router assembly

use crate::api_doc::get_openapi_spec;
use crate::auth::middleware::auth_middleware;
use crate::constants::{API_PREFIX, MEDIA_ROUTE};
use crate::handlers::{health, video_upload};
use crate::middleware::declared_size_guard;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};

/// Build the application router
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    // The whole request counts against the ceiling, not only the `video` part
    let body_limit = usize::try_from(config.max_video_size_bytes())
        .context("Upload body limit does not fit in usize")?;

    let mut app = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone(), body_limit));

    // Local backend URLs point back at this server
    if config.storage_backend() == StorageBackend::Local {
        tracing::info!(
            root = config.local_storage_path(),
            "Serving local storage under {}",
            MEDIA_ROUTE
        );
        app = app.nest_service(MEDIA_ROUTE, ServeDir::new(config.local_storage_path()));
    }

    let app = app
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(body_limit_bytes = body_limit, "Routes configured");

    Ok(app)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(get_openapi_spec()) }),
        )
}

/// Routes behind bearer auth. Layers run outermost first: declared size,
/// then auth. `DefaultBodyLimit` caps the streamed body read by `Multipart`,
/// whose length-limit errors surface as 413.
fn protected_routes(state: Arc<AppState>, body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_PREFIX),
            post(video_upload::upload_video),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            declared_size_guard,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid CORS_ORIGINS entry")?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
