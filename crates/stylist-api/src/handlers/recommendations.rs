//! Body-shape, occasion and weather lookups

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use stylist_core::{CategoryAxis, CategoryInfo, RecommendationRecord};

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BodyShapeRequest {
    pub shape: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OccasionRequest {
    pub occasion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherRequest {
    pub weather: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyShapeResponse {
    pub shape: String,
    pub recommendations: Vec<RecommendationRecord>,
    pub shape_info: CategoryInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccasionResponse {
    pub occasion: String,
    pub recommendations: Vec<RecommendationRecord>,
    pub occasion_info: CategoryInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub weather: String,
    pub recommendations: Vec<RecommendationRecord>,
    pub weather_info: CategoryInfo,
}

#[tracing::instrument(skip_all, fields(key = ?request.shape))]
pub async fn body_shape_recommendation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BodyShapeRequest>,
) -> Result<Json<BodyShapeResponse>, HttpAppError> {
    let entry = state
        .catalog
        .lookup(CategoryAxis::BodyShape, request.shape.as_deref())?;

    Ok(Json(BodyShapeResponse {
        shape: entry.key.clone(),
        recommendations: entry.recommendations.clone(),
        shape_info: entry.info.clone(),
    }))
}

#[tracing::instrument(skip_all, fields(key = ?request.occasion))]
pub async fn occasion_recommendation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<OccasionRequest>,
) -> Result<Json<OccasionResponse>, HttpAppError> {
    let entry = state
        .catalog
        .lookup(CategoryAxis::Occasion, request.occasion.as_deref())?;

    Ok(Json(OccasionResponse {
        occasion: entry.key.clone(),
        recommendations: entry.recommendations.clone(),
        occasion_info: entry.info.clone(),
    }))
}

#[tracing::instrument(skip_all, fields(key = ?request.weather))]
pub async fn weather_recommendation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<WeatherRequest>,
) -> Result<Json<WeatherResponse>, HttpAppError> {
    let entry = state
        .catalog
        .lookup(CategoryAxis::Weather, request.weather.as_deref())?;

    Ok(Json(WeatherResponse {
        weather: entry.key.clone(),
        recommendations: entry.recommendations.clone(),
        weather_info: entry.info.clone(),
    }))
}
