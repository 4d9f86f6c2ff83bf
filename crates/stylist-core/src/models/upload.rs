//! Uploaded file model

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A file accepted from a multipart request and written to local storage.
///
/// Lives for a single request unless it was stored for public serving.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage {
    /// Generated storage key (the filename inside the upload directory).
    pub key: String,
    /// Absolute or working-directory-relative path on disk.
    pub path: PathBuf,
    /// Public URL under which the file is served.
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub received_at: DateTime<Utc>,
}

impl UploadedImage {
    /// MIME type to use when inlining the file, defaulting to JPEG for
    /// clients that send no or a generic content type.
    pub fn image_mime_type(&self) -> &str {
        let normalized = self
            .content_type
            .split(';')
            .next()
            .map(str::trim)
            .unwrap_or("");
        if normalized.starts_with("image/") {
            normalized
        } else {
            "image/jpeg"
        }
    }
}
