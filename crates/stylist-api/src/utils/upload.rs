//! Multipart intake shared by the upload and analysis routes

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::Utc;
use stylist_core::{AppError, UploadedImage};
use stylist_storage::Storage;

use crate::error::HttpAppError;

/// Form field names accepted for the uploaded file.
pub const FILE_FIELD_NAMES: [&str; 2] = ["file", "image"];

/// A file pulled out of a multipart request, not yet persisted.
#[derive(Debug)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Extract the single uploaded file from a multipart form.
///
/// Parts other than a file under `file`/`image` are drained and ignored. A second file
/// field is rejected, and a request with no file fails with `missing_message`.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    missing_message: &str,
) -> Result<IncomingFile, HttpAppError> {
    let mut found: Option<IncomingFile> = None;

    while let Some(field) = multipart.next_field().await? {
        // Plain text parts never count as the upload, even under a file field name.
        let is_file_field = field.file_name().is_some()
            && field
                .name()
                .map(|name| FILE_FIELD_NAMES.contains(&name))
                .unwrap_or(false);

        if !is_file_field {
            field.bytes().await?;
            continue;
        }

        if found.is_some() {
            return Err(AppError::InvalidInput(
                "Only one file may be uploaded per request".to_string(),
            )
            .into());
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field.bytes().await?;

        found = Some(IncomingFile {
            filename,
            content_type,
            data,
        });
    }

    match found {
        Some(file) if !file.data.is_empty() => Ok(file),
        _ => Err(AppError::InvalidInput(missing_message.to_string()).into()),
    }
}

/// Persist an incoming file and describe it for the analyzers.
pub async fn store_upload(
    storage: &dyn Storage,
    file: IncomingFile,
) -> Result<UploadedImage, HttpAppError> {
    let size_bytes = file.data.len();
    let stored = storage.store(&file.filename, file.data).await?;

    Ok(UploadedImage {
        key: stored.key,
        path: stored.path,
        url: stored.url,
        original_filename: file.filename,
        content_type: file.content_type,
        size_bytes,
        received_at: Utc::now(),
    })
}

/// Delete an analysis upload once the analyzer is done with it. Failures are
/// logged only.
pub async fn discard_upload(storage: &dyn Storage, image: &UploadedImage) {
    if let Err(e) = storage.delete(&image.key).await {
        tracing::warn!(key = %image.key, error = %e, "Failed to remove analysis upload");
    }
}
