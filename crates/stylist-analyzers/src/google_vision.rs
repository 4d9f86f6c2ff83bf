//! Outfit labelling with Google Cloud Vision label detection

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use stylist_core::UploadedImage;

use crate::analyzer::{read_image_bytes, with_timeout, AnalyzerError, OutfitLabeler};

pub const GOOGLE_VISION_API_BASE: &str = "https://vision.googleapis.com/v1";
const MAX_RESULTS: u32 = 20;

/// Google Vision labeler configuration
#[derive(Clone)]
pub struct GoogleVisionConfig {
    pub api_key: String,
    pub api_base: String,
    /// Minimum score threshold for label detection (0.0-1.0)
    pub min_score: f32,
    pub timeout: Duration,
}

impl Debug for GoogleVisionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleVisionConfig")
            .field("api_base", &self.api_base)
            .field("min_score", &self.min_score)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

pub struct GoogleVisionOutfitLabeler {
    http_client: reqwest::Client,
    config: GoogleVisionConfig,
}

impl Debug for GoogleVisionOutfitLabeler {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleVisionOutfitLabeler").finish()
    }
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    responses: Option<Vec<AnnotateImageResponse>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    label_annotations: Option<Vec<EntityAnnotation>>,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    code: Option<i32>,
    message: Option<String>,
}

impl GoogleVisionOutfitLabeler {
    pub fn new(config: GoogleVisionConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client for Google Vision API")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    async fn annotate_image(&self, image_data: Vec<u8>) -> Result<VisionResponse, AnalyzerError> {
        let url = format!(
            "{}/images:annotate?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.api_key
        );

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image_data);
        let request_body = json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "LABEL_DETECTION", "maxResults": MAX_RESULTS }]
            }]
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key.
                AnalyzerError::Request(format!(
                    "Failed to send request to Google Vision API: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AnalyzerError::Request(format!(
                "Google Vision API request failed: {} - {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AnalyzerError::MalformedOutput(format!(
                "Failed to parse Google Vision API response: {}",
                e.without_url()
            ))
        })
    }

    fn process_results(
        response: VisionResponse,
        min_score: f32,
    ) -> Result<Vec<String>, AnalyzerError> {
        let first = match response.responses.and_then(|r| r.into_iter().next()) {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };

        if let Some(error) = first.error {
            return Err(AnalyzerError::Request(format!(
                "Google Vision API error: {:?} - {}",
                error.code,
                error.message.unwrap_or_default()
            )));
        }

        Ok(first
            .label_annotations
            .unwrap_or_default()
            .into_iter()
            .filter(|label| label.score.unwrap_or(0.0) as f32 >= min_score)
            .filter_map(|label| label.description)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect())
    }

    async fn run(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError> {
        let bytes = read_image_bytes(image).await?;
        let response = self.annotate_image(bytes).await?;
        Self::process_results(response, self.config.min_score)
    }
}

#[async_trait]
impl OutfitLabeler for GoogleVisionOutfitLabeler {
    fn name(&self) -> &str {
        "google_vision"
    }

    #[tracing::instrument(skip(self, image), fields(analyzer = "google_vision", key = %image.key))]
    async fn label(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError> {
        let start = Instant::now();
        let labels = with_timeout(self.config.timeout, self.run(image)).await?;

        tracing::info!(
            label_count = labels.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Google Vision labelling finished"
        );

        Ok(labels)
    }
}
