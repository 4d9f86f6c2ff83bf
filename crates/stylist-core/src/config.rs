//! Configuration module
//!
//! Settings come from environment variables, optionally loaded from a `.env`
//! file. Parsing is separated from the process environment through
//! [`Config::from_lookup`] so tests can supply their own variables.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CANDIDATE_LABELS, DEFAULT_REPLICATE_API_BASE, DEFAULT_REPLICATE_MODEL_VERSION,
    DEFAULT_SESSION_JWKS_URL,
};

const DEFAULT_PORT: u16 = 5000;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const UPLOAD_RETENTION_SECS: u64 = 86_400;
const UPLOAD_SWEEP_INTERVAL_SECS: u64 = 300;
const ANALYZER_TIMEOUT_SECS: u64 = 60;
const GOOGLE_VISION_MIN_SCORE: f32 = 0.5;

/// Which skin-tone analyzer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinToneDetectorKind {
    /// In-process pixel analysis.
    Builtin,
    /// External script invoked per request.
    Script,
}

impl FromStr for SkinToneDetectorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "builtin" => Ok(SkinToneDetectorKind::Builtin),
            "script" => Ok(SkinToneDetectorKind::Script),
            _ => Err(anyhow::anyhow!("Invalid skin tone detector: {}", s)),
        }
    }
}

impl Display for SkinToneDetectorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SkinToneDetectorKind::Builtin => write!(f, "builtin"),
            SkinToneDetectorKind::Script => write!(f, "script"),
        }
    }
}

/// Which hosted service labels outfit images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutfitAnalyzerKind {
    Replicate,
    GoogleVision,
    None,
}

impl FromStr for OutfitAnalyzerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replicate" => Ok(OutfitAnalyzerKind::Replicate),
            "google_vision" | "google-vision" => Ok(OutfitAnalyzerKind::GoogleVision),
            "none" | "" => Ok(OutfitAnalyzerKind::None),
            _ => Err(anyhow::anyhow!("Invalid outfit analyzer: {}", s)),
        }
    }
}

impl Display for OutfitAnalyzerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutfitAnalyzerKind::Replicate => write!(f, "replicate"),
            OutfitAnalyzerKind::GoogleVision => write!(f, "google_vision"),
            OutfitAnalyzerKind::None => write!(f, "none"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub public_base_url: String,
    // Upload intake
    pub upload_dir: PathBuf,
    pub max_upload_size_bytes: usize,
    /// Seconds a file stored through `/upload` is kept. 0 = kept forever.
    pub upload_retention_secs: u64,
    pub upload_sweep_interval_secs: u64,
    // Analyzers
    pub analyzer_timeout_secs: u64,
    pub skin_tone_detector: SkinToneDetectorKind,
    pub skin_tone_script: Option<PathBuf>,
    pub skin_tone_interpreter: String,
    pub outfit_analyzer: OutfitAnalyzerKind,
    pub replicate_api_token: Option<String>,
    pub replicate_model_version: String,
    pub replicate_api_base: String,
    pub outfit_candidate_labels: Vec<String>,
    pub google_vision_api_key: Option<String>,
    pub google_vision_min_score: f32,
    // Session guard
    pub session_guard_enabled: bool,
    pub firebase_project_id: Option<String>,
    pub session_jwks_url: String,
    /// Alternative catalog document; the embedded one is used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build and validate a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port: u16 = parse_var("PORT", var("PORT"), DEFAULT_PORT)?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_base_url = var("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", server_port));

        let max_upload_size_mb: usize =
            parse_var("MAX_UPLOAD_SIZE_MB", var("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB)?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let skin_tone_detector = match var("SKIN_TONE_DETECTOR") {
            Some(kind) => kind.parse()?,
            None => SkinToneDetectorKind::Builtin,
        };

        let outfit_analyzer = match var("OUTFIT_ANALYZER") {
            Some(kind) => kind.parse()?,
            None => OutfitAnalyzerKind::Replicate,
        };

        let outfit_candidate_labels = var("OUTFIT_CANDIDATE_LABELS")
            .unwrap_or_else(|| DEFAULT_CANDIDATE_LABELS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            server_port,
            environment,
            cors_origins,
            public_base_url,
            upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            max_upload_size_bytes,
            upload_retention_secs: parse_var(
                "UPLOAD_RETENTION_SECS",
                var("UPLOAD_RETENTION_SECS"),
                UPLOAD_RETENTION_SECS,
            )?,
            upload_sweep_interval_secs: parse_var(
                "UPLOAD_SWEEP_INTERVAL_SECS",
                var("UPLOAD_SWEEP_INTERVAL_SECS"),
                UPLOAD_SWEEP_INTERVAL_SECS,
            )?,
            analyzer_timeout_secs: parse_var(
                "ANALYZER_TIMEOUT_SECS",
                var("ANALYZER_TIMEOUT_SECS"),
                ANALYZER_TIMEOUT_SECS,
            )?,
            skin_tone_detector,
            skin_tone_script: var("SKIN_TONE_SCRIPT").map(PathBuf::from),
            skin_tone_interpreter: var("SKIN_TONE_INTERPRETER")
                .unwrap_or_else(|| "python3".to_string()),
            outfit_analyzer,
            replicate_api_token: var("REPLICATE_API_TOKEN"),
            replicate_model_version: var("REPLICATE_MODEL_VERSION")
                .unwrap_or_else(|| DEFAULT_REPLICATE_MODEL_VERSION.to_string()),
            replicate_api_base: var("REPLICATE_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_REPLICATE_API_BASE.to_string()),
            outfit_candidate_labels,
            google_vision_api_key: var("GOOGLE_VISION_API_KEY"),
            google_vision_min_score: parse_var(
                "GOOGLE_VISION_MIN_SCORE",
                var("GOOGLE_VISION_MIN_SCORE"),
                GOOGLE_VISION_MIN_SCORE,
            )?,
            session_guard_enabled: var("SESSION_GUARD_ENABLED")
                .map(|v| v.trim().to_lowercase())
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            firebase_project_id: var("FIREBASE_PROJECT_ID"),
            session_jwks_url: var("SESSION_JWKS_URL")
                .unwrap_or_else(|| DEFAULT_SESSION_JWKS_URL.to_string()),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.analyzer_timeout_secs == 0 {
            return Err(anyhow::anyhow!("ANALYZER_TIMEOUT_SECS must be greater than 0"));
        }

        if self.upload_retention_secs > 0 && self.upload_sweep_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_SWEEP_INTERVAL_SECS must be greater than 0 when retention is enabled"
            ));
        }

        if self.skin_tone_detector == SkinToneDetectorKind::Script
            && self.skin_tone_script.is_none()
        {
            return Err(anyhow::anyhow!(
                "SKIN_TONE_SCRIPT must be set when SKIN_TONE_DETECTOR=script"
            ));
        }

        match self.outfit_analyzer {
            OutfitAnalyzerKind::Replicate => {
                if self.replicate_api_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "REPLICATE_API_TOKEN must be set when OUTFIT_ANALYZER=replicate \
                         (set OUTFIT_ANALYZER=none to disable outfit analysis)"
                    ));
                }
                if self.outfit_candidate_labels.is_empty() {
                    return Err(anyhow::anyhow!(
                        "OUTFIT_CANDIDATE_LABELS must contain at least one label"
                    ));
                }
            }
            OutfitAnalyzerKind::GoogleVision => {
                if self.google_vision_api_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "GOOGLE_VISION_API_KEY must be set when OUTFIT_ANALYZER=google_vision"
                    ));
                }
                if !(0.0..=1.0).contains(&self.google_vision_min_score) {
                    return Err(anyhow::anyhow!(
                        "GOOGLE_VISION_MIN_SCORE must be between 0.0 and 1.0"
                    ));
                }
            }
            OutfitAnalyzerKind::None => {}
        }

        if self.session_guard_enabled && self.firebase_project_id.is_none() {
            return Err(anyhow::anyhow!(
                "SESSION_GUARD_ENABLED=true requires FIREBASE_PROJECT_ID to be set"
            ));
        }

        Ok(())
    }
}

/// Parse an optional numeric variable. Unset means `default`; set but unparseable is an error.
fn parse_var<T: FromStr>(key: &str, value: Option<String>, default: T) -> anyhow::Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
