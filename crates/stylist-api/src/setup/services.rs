//! Catalog, storage, analyzer and session wiring

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use stylist_analyzers::{create_outfit_labeler, create_skin_tone_detector};
use stylist_core::{Catalog, CategoryAxis, Config};
use stylist_storage::{LocalStorage, Storage};

use crate::auth::{FirebaseSessionVerifier, SessionVerifier};
use crate::services::UploadSweeper;
use crate::state::AppState;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let catalog = load_catalog(config)?;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.upload_dir.clone(), uploads_base_url(config))
            .await
            .with_context(|| {
                format!(
                    "Failed to prepare upload directory {}",
                    config.upload_dir.display()
                )
            })?,
    );

    let skin_tone_detector = create_skin_tone_detector(config)?;
    let outfit_labeler = create_outfit_labeler(config)?;
    let session_verifier = setup_session_verifier(config)?;

    Ok(Arc::new(AppState {
        config: config.clone(),
        catalog: Arc::new(catalog),
        storage,
        skin_tone_detector,
        outfit_labeler,
        session_verifier,
        started_at: Instant::now(),
    }))
}

/// Spawn the upload retention sweeper unless retention is unlimited.
pub fn start_background_tasks(config: &Config, state: &Arc<AppState>) {
    if config.upload_retention_secs == 0 {
        tracing::info!("Upload retention disabled; uploaded files are kept");
        return;
    }

    let sweeper = Arc::new(UploadSweeper::new(
        state.storage.clone(),
        Duration::from_secs(config.upload_retention_secs),
        Duration::from_secs(config.upload_sweep_interval_secs.max(1)),
    ));
    sweeper.start();

    tracing::info!(
        retention_secs = config.upload_retention_secs,
        interval_secs = config.upload_sweep_interval_secs,
        "Upload sweeper started"
    );
}

/// Public URL prefix that stored keys are appended to.
pub fn uploads_base_url(config: &Config) -> String {
    format!("{}/uploads", config.public_base_url.trim_end_matches('/'))
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::embedded()?,
    };

    tracing::info!(
        body_shapes = catalog.entries(CategoryAxis::BodyShape).len(),
        occasions = catalog.entries(CategoryAxis::Occasion).len(),
        weather = catalog.entries(CategoryAxis::Weather).len(),
        skin_tones = catalog.skin_tone_labels().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

fn setup_session_verifier(config: &Config) -> Result<Option<Arc<dyn SessionVerifier>>> {
    if !config.session_guard_enabled {
        return Ok(None);
    }

    let project_id = config
        .firebase_project_id
        .clone()
        .context("FIREBASE_PROJECT_ID must be set when SESSION_GUARD_ENABLED=true")?;

    let verifier = FirebaseSessionVerifier::new(config.session_jwks_url.clone(), project_id)?;
    Ok(Some(Arc::new(verifier)))
}
