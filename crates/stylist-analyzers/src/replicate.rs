//! Outfit labelling with a Replicate-hosted CLIP model
//!
//! The uploaded image is sent inline as a base64 data URI together with the
//! candidate clothing labels. Replicate runs predictions asynchronously, so
//! the prediction is polled until it reaches a terminal state.

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use stylist_core::UploadedImage;
use tokio::time::sleep;

use crate::analyzer::{read_image_bytes, with_timeout, AnalyzerError, OutfitLabeler};

const MAX_POLL_ATTEMPTS: u32 = 300;
const POLL_INTERVAL_SECS: u64 = 1;

/// Replicate labeler configuration
#[derive(Clone)]
pub struct ReplicateConfig {
    pub api_token: String,
    pub model_version: String,
    /// API root, e.g. `https://api.replicate.com/v1`.
    pub api_base: String,
    pub candidate_labels: Vec<String>,
    pub timeout: Duration,
}

impl Debug for ReplicateConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ReplicateConfig")
            .field("model_version", &self.model_version)
            .field("api_base", &self.api_base)
            .field("candidate_labels", &self.candidate_labels)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

pub struct ReplicateOutfitLabeler {
    http_client: reqwest::Client,
    config: ReplicateConfig,
    poll_interval: Duration,
}

impl Debug for ReplicateOutfitLabeler {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ReplicateOutfitLabeler").finish()
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    id: String,
    status: String,
    output: Option<Value>,
    error: Option<Value>,
}

impl ReplicateOutfitLabeler {
    pub fn new(config: ReplicateConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client for Replicate")?;

        Ok(Self {
            http_client,
            config,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn create_prediction(&self, image_uri: String) -> Result<PredictionResponse, AnalyzerError> {
        let response = self
            .http_client
            .post(self.api_url("predictions"))
            .header("Authorization", format!("Token {}", self.config.api_token))
            .header("Content-Type", "application/json")
            .json(&json!({
                "version": self.config.model_version,
                "input": {
                    "image": image_uri,
                    "candidate_labels": self.config.candidate_labels.join(", "),
                },
            }))
            .send()
            .await
            .map_err(|e| {
                AnalyzerError::Request(format!("Failed to send request to Replicate API: {}", e))
            })?;

        parse_response(response, "Replicate API request failed").await
    }

    async fn get_prediction(&self, prediction_id: &str) -> Result<PredictionResponse, AnalyzerError> {
        let response = self
            .http_client
            .get(self.api_url(&format!("predictions/{}", prediction_id)))
            .header("Authorization", format!("Token {}", self.config.api_token))
            .send()
            .await
            .map_err(|e| {
                AnalyzerError::Request(format!(
                    "Failed to get prediction status from Replicate API: {}",
                    e
                ))
            })?;

        parse_response(response, "Failed to get prediction status").await
    }

    /// Poll until the prediction succeeds, fails or is canceled.
    async fn wait_for_prediction(
        &self,
        mut prediction: PredictionResponse,
    ) -> Result<PredictionResponse, AnalyzerError> {
        for attempt in 0..MAX_POLL_ATTEMPTS {
            match prediction.status.as_str() {
                "succeeded" => {
                    tracing::info!(
                        prediction_id = %prediction.id,
                        attempts = attempt + 1,
                        "Replicate prediction completed successfully"
                    );
                    return Ok(prediction);
                }
                "failed" => {
                    let error_msg = prediction
                        .error
                        .map(|e| match e {
                            Value::String(s) => s,
                            other => other.to_string(),
                        })
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(AnalyzerError::Failed(format!(
                        "Replicate prediction failed: {}",
                        error_msg
                    )));
                }
                "canceled" => {
                    return Err(AnalyzerError::Failed(
                        "Replicate prediction was canceled".to_string(),
                    ));
                }
                "starting" | "processing" => {
                    tracing::debug!(
                        prediction_id = %prediction.id,
                        attempt = attempt + 1,
                        status = %prediction.status,
                        "Waiting for Replicate prediction to complete"
                    );
                }
                _ => {
                    tracing::warn!(
                        prediction_id = %prediction.id,
                        status = %prediction.status,
                        "Unknown prediction status"
                    );
                }
            }

            sleep(self.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
        }

        Err(AnalyzerError::Timeout(self.poll_interval * MAX_POLL_ATTEMPTS))
    }

    async fn run(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError> {
        let bytes = read_image_bytes(image).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let image_uri = format!("data:{};base64,{}", image.image_mime_type(), encoded);

        let created = self.create_prediction(image_uri).await?;
        let finished = self.wait_for_prediction(created).await?;

        let output = finished.output.ok_or_else(|| {
            AnalyzerError::MalformedOutput("Replicate prediction has no output".to_string())
        })?;
        extract_labels(&output)
    }
}

async fn parse_response(
    response: reqwest::Response,
    context: &str,
) -> Result<PredictionResponse, AnalyzerError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AnalyzerError::Request(format!(
            "{}: {} - {}",
            context, status, error_text
        )));
    }

    response.json().await.map_err(|e| {
        AnalyzerError::MalformedOutput(format!("Failed to parse Replicate API response: {}", e))
    })
}

/// Pull clothing labels out of a prediction's output.
///
/// Accepted shapes: a list of strings, a list of `{label, score}` objects, an
/// object wrapping either under `similar_texts` or `labels`, or an object
/// mapping labels to scores. Scored labels are returned best first.
pub fn extract_labels(output: &Value) -> Result<Vec<String>, AnalyzerError> {
    match output {
        Value::String(label) => Ok(clean(vec![label.clone()])),
        Value::Array(items) => {
            if items.iter().all(Value::is_string) {
                let labels = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                return Ok(clean(labels));
            }

            let mut scored = Vec::with_capacity(items.len());
            for item in items {
                let label = item
                    .get("label")
                    .or_else(|| item.get("text"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        AnalyzerError::MalformedOutput(format!(
                            "unexpected prediction output item: {}",
                            item
                        ))
                    })?;
                let score = item.get("score").and_then(Value::as_f64).unwrap_or(0.0);
                scored.push((label.to_string(), score));
            }
            Ok(clean(rank(scored)))
        }
        Value::Object(map) => {
            for key in ["similar_texts", "labels"] {
                if let Some(inner) = map.get(key) {
                    return extract_labels(inner);
                }
            }

            let mut scored = Vec::with_capacity(map.len());
            for (label, score) in map {
                let score = score.as_f64().ok_or_else(|| {
                    AnalyzerError::MalformedOutput(format!(
                        "unexpected prediction output field: {}",
                        label
                    ))
                })?;
                scored.push((label.clone(), score));
            }
            Ok(clean(rank(scored)))
        }
        other => Err(AnalyzerError::MalformedOutput(format!(
            "unexpected prediction output: {}",
            other
        ))),
    }
}

fn rank(mut scored: Vec<(String, f64)>) -> Vec<String> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(label, _)| label).collect()
}

fn clean(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[async_trait]
impl OutfitLabeler for ReplicateOutfitLabeler {
    fn name(&self) -> &str {
        "replicate"
    }

    #[tracing::instrument(skip(self, image), fields(analyzer = "replicate", key = %image.key))]
    async fn label(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError> {
        let start = Instant::now();
        let labels = with_timeout(self.config.timeout, self.run(image)).await?;

        tracing::info!(
            label_count = labels.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Replicate labelling finished"
        );

        Ok(labels)
    }
}
