//! Analyzer traits and shared error type

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use stylist_core::{SkinToneReading, UploadedImage};
use thiserror::Error;

/// Analyzer failure, classified by what the caller should report.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer process could not be started.
    #[error("Failed to start analyzer: {0}")]
    Spawn(String),

    /// The analyzer ran and reported failure (non-zero exit, failed prediction).
    #[error("Analyzer failed: {0}")]
    Failed(String),

    #[error("Analyzer timed out after {0:?}")]
    Timeout(Duration),

    /// Network error or non-2xx response from a hosted analyzer.
    #[error("Analyzer request failed: {0}")]
    Request(String),

    /// The analyzer answered with output that could not be understood.
    #[error("Malformed analyzer output: {0}")]
    MalformedOutput(String),

    /// The uploaded file is not a decodable image.
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl AnalyzerError {
    pub fn is_parse(&self) -> bool {
        matches!(self, AnalyzerError::MalformedOutput(_))
    }
}

/// Detects the dominant skin tone in an image.
#[async_trait]
pub trait SkinToneDetector: Send + Sync {
    /// Short identifier used in logs and `/health`.
    fn name(&self) -> &str;

    async fn detect(&self, image: &UploadedImage) -> Result<SkinToneReading, AnalyzerError>;
}

/// Produces clothing labels for an image.
#[async_trait]
pub trait OutfitLabeler: Send + Sync {
    /// Short identifier used in logs, `/health` and responses.
    fn name(&self) -> &str;

    async fn label(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError>;
}

/// Run an analyzer future, failing with [`AnalyzerError::Timeout`] once
/// `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, AnalyzerError>
where
    F: Future<Output = Result<T, AnalyzerError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AnalyzerError::Timeout(limit)),
    }
}

/// Read the stored upload from disk.
pub(crate) async fn read_image_bytes(image: &UploadedImage) -> Result<Vec<u8>, AnalyzerError> {
    tokio::fs::read(&image.path).await.map_err(|e| {
        AnalyzerError::Failed(format!(
            "Failed to read uploaded file {}: {}",
            image.path.display(),
            e
        ))
    })
}
