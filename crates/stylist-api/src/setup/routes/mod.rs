//! Route configuration and setup.
//!
//! Endpoint groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use stylist_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{session_guard, AuthState};
use crate::state::AppState;

/// Setup all application routes
///
/// Every POST endpoint sits behind the session guard when the state carries a
/// session verifier. `/uploads` serves stored files read-only.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let public_routes = public_routes();

    let mut protected_routes = domains::recommendation_routes().merge(domains::image_routes());
    match state.session_verifier.clone() {
        Some(verifier) => {
            tracing::info!("Session guard enabled for POST endpoints");
            protected_routes = protected_routes.layer(axum::middleware::from_fn_with_state(
                Arc::new(AuthState { verifier }),
                session_guard,
            ));
        }
        None => tracing::warn!("Session guard disabled - POST endpoints are open"),
    }

    let app = public_routes
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/test", get(health::api_test))
        .route("/health", get(health::health_check))
        .merge(domains::catalog_routes())
}
