use std::sync::Arc;
use std::time::Instant;

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use serde::Serialize;
use stylist_core::{Rgb, SkinToneRecord};

use crate::error::HttpAppError;
use crate::handlers::analyzer_failure;
use crate::state::AppState;
use crate::utils::upload::{discard_upload, extract_multipart_file, store_upload};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinToneResponse {
    pub skin_tone: String,
    pub rgb: Rgb,
    pub hex: String,
    pub recommendations: SkinToneRecord,
}

/// Detect the dominant skin tone in an uploaded image and attach the matching
/// colour advice. The upload is removed once the detector has finished.
#[tracing::instrument(skip_all)]
pub async fn detect_skin_tone(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SkinToneResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart?, "No image uploaded").await?;
    let image = store_upload(state.storage.as_ref(), file).await?;

    let detector = state.skin_tone_detector.as_ref();
    let started = Instant::now();
    let result = detector.detect(&image).await;
    discard_upload(state.storage.as_ref(), &image).await;

    let reading = result.map_err(|e| {
        analyzer_failure(e, "Failed to detect skin tone", "Failed to parse skin tone data")
    })?;

    tracing::info!(
        analyzer = detector.name(),
        key = %image.key,
        label = %reading.label,
        duration_ms = started.elapsed().as_millis() as u64,
        "Skin tone detected"
    );

    let recommendations = state.catalog.skin_tone(&reading.label).clone();

    Ok(Json(SkinToneResponse {
        skin_tone: reading.label,
        rgb: reading.rgb,
        hex: reading.hex,
        recommendations,
    }))
}
