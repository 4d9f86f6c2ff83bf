//! Route groups for the recommendation, catalog and image-analysis endpoints.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new().route("/categories", get(handlers::catalog::list_categories))
}

pub fn recommendation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/body-shape-recommendation",
            post(handlers::recommendations::body_shape_recommendation),
        )
        .route(
            "/occasion-recommendation",
            post(handlers::recommendations::occasion_recommendation),
        )
        .route(
            "/weather-recommendation",
            post(handlers::recommendations::weather_recommendation),
        )
}

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .route("/detect-skintone", post(handlers::skin_tone::detect_skin_tone))
        .route("/analyze-outfit", post(handlers::outfit::analyze_outfit))
}
