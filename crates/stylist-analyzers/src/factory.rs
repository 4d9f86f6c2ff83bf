//! Analyzer construction from configuration

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stylist_core::{Config, OutfitAnalyzerKind, SkinToneDetectorKind};

use crate::analyzer::{OutfitLabeler, SkinToneDetector};
use crate::builtin::BuiltinSkinToneDetector;
use crate::google_vision::{GoogleVisionConfig, GoogleVisionOutfitLabeler, GOOGLE_VISION_API_BASE};
use crate::replicate::{ReplicateConfig, ReplicateOutfitLabeler};
use crate::script::ScriptSkinToneDetector;

/// Create the skin-tone detector selected by `SKIN_TONE_DETECTOR`.
pub fn create_skin_tone_detector(config: &Config) -> anyhow::Result<Arc<dyn SkinToneDetector>> {
    let timeout = Duration::from_secs(config.analyzer_timeout_secs);

    let detector: Arc<dyn SkinToneDetector> = match config.skin_tone_detector {
        SkinToneDetectorKind::Builtin => Arc::new(BuiltinSkinToneDetector::new(timeout)),
        SkinToneDetectorKind::Script => {
            let script = config
                .skin_tone_script
                .clone()
                .context("SKIN_TONE_SCRIPT must be set when SKIN_TONE_DETECTOR=script")?;
            Arc::new(ScriptSkinToneDetector::new(
                config.skin_tone_interpreter.clone(),
                script,
                timeout,
            ))
        }
    };

    tracing::info!(analyzer = detector.name(), "Skin tone detector configured");
    Ok(detector)
}

/// Create the outfit labeler selected by `OUTFIT_ANALYZER`, or `None` when
/// outfit analysis is disabled.
pub fn create_outfit_labeler(config: &Config) -> anyhow::Result<Option<Arc<dyn OutfitLabeler>>> {
    let timeout = Duration::from_secs(config.analyzer_timeout_secs);

    let labeler: Arc<dyn OutfitLabeler> = match config.outfit_analyzer {
        OutfitAnalyzerKind::None => {
            tracing::warn!("Outfit analysis disabled; /analyze-outfit will return 503");
            return Ok(None);
        }
        OutfitAnalyzerKind::Replicate => {
            let api_token = config
                .replicate_api_token
                .clone()
                .context("REPLICATE_API_TOKEN must be set when OUTFIT_ANALYZER=replicate")?;
            Arc::new(ReplicateOutfitLabeler::new(ReplicateConfig {
                api_token,
                model_version: config.replicate_model_version.clone(),
                api_base: config.replicate_api_base.clone(),
                candidate_labels: config.outfit_candidate_labels.clone(),
                timeout,
            })?)
        }
        OutfitAnalyzerKind::GoogleVision => {
            let api_key = config
                .google_vision_api_key
                .clone()
                .context("GOOGLE_VISION_API_KEY must be set when OUTFIT_ANALYZER=google_vision")?;
            Arc::new(GoogleVisionOutfitLabeler::new(GoogleVisionConfig {
                api_key,
                api_base: GOOGLE_VISION_API_BASE.to_string(),
                min_score: config.google_vision_min_score,
                timeout,
            })?)
        }
    };

    tracing::info!(analyzer = labeler.name(), "Outfit labeler configured");
    Ok(Some(labeler))
}
