use std::sync::Arc;

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_file, store_upload};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    /// Location of the stored file on the server's filesystem.
    pub file_path: String,
    /// Public URL under `/uploads`.
    pub file_url: String,
}

/// Store an image and return where it can be fetched. The file stays until
/// the retention sweeper removes it.
#[tracing::instrument(skip_all)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart?, "No file uploaded").await?;
    let image = store_upload(state.storage.as_ref(), file).await?;

    tracing::info!(
        key = %image.key,
        filename = %image.original_filename,
        size_bytes = image.size_bytes,
        "File uploaded"
    );

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file_path: image.path.display().to_string(),
        file_url: image.url,
    }))
}
