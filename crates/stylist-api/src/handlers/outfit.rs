use std::sync::Arc;
use std::time::Instant;

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use serde::Serialize;
use stylist_core::{constants::EMPTY_LABEL_HINTS, AppError};

use crate::error::HttpAppError;
use crate::handlers::analyzer_failure;
use crate::state::AppState;
use crate::utils::upload::{discard_upload, extract_multipart_file, store_upload};

#[derive(Debug, Serialize)]
pub struct OutfitAnalysisResponse {
    pub message: String,
    pub analyzer: String,
    pub labels: Vec<String>,
}

/// Label the clothing in an uploaded image with the configured outfit
/// analyzer. The upload is removed once the analyzer has finished.
#[tracing::instrument(skip_all)]
pub async fn analyze_outfit(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OutfitAnalysisResponse>, HttpAppError> {
    let labeler = state.outfit_labeler.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Outfit analysis is not configured".to_string())
    })?;

    let file = extract_multipart_file(multipart?, "No image uploaded").await?;
    let image = store_upload(state.storage.as_ref(), file).await?;

    let started = Instant::now();
    let result = labeler.label(&image).await;
    discard_upload(state.storage.as_ref(), &image).await;

    let mut labels = result
        .map_err(|e| analyzer_failure(e, "Failed to analyze outfit", "Failed to parse analyzer output"))?;

    tracing::info!(
        analyzer = labeler.name(),
        key = %image.key,
        labels = labels.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Outfit analyzed"
    );

    if labels.is_empty() {
        labels = EMPTY_LABEL_HINTS.iter().map(|hint| hint.to_string()).collect();
    }

    Ok(Json(OutfitAnalysisResponse {
        message: "Success".to_string(),
        analyzer: labeler.name().to_string(),
        labels,
    }))
}
