//! Test helpers: build AppState and router for integration tests.
//!
//! Analyzers are replaced by in-memory stubs unless a test installs a real one;
//! uploads go to a per-test temporary directory.

#![allow(dead_code)]

pub mod auth;
pub mod stubs;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use stylist_analyzers::{OutfitLabeler, SkinToneDetector};
use stylist_api::auth::SessionVerifier;
use stylist_api::setup::{routes, services::uploads_base_url};
use stylist_api::state::AppState;
use stylist_core::{Catalog, Config};
use stylist_storage::{LocalStorage, Storage};
use tempfile::TempDir;

use self::stubs::StubSkinToneDetector;

/// PNG signature and IHDR chunk. Stub analyzers never decode it.
pub const TEST_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xde,
];

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> PathBuf {
        self._temp_dir.path().to_path_buf()
    }

    /// Files currently present in the upload directory.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self._temp_dir.path())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct TestAppBuilder {
    skin_tone_detector: Arc<dyn SkinToneDetector>,
    outfit_labeler: Option<Arc<dyn OutfitLabeler>>,
    session_verifier: Option<Arc<dyn SessionVerifier>>,
    env: HashMap<String, String>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            skin_tone_detector: StubSkinToneDetector::returning("Fair", (255, 224, 196), "#FFE0C4"),
            outfit_labeler: None,
            session_verifier: None,
            env: HashMap::new(),
        }
    }
}

impl TestAppBuilder {
    pub fn skin_tone_detector(mut self, detector: Arc<dyn SkinToneDetector>) -> Self {
        self.skin_tone_detector = detector;
        self
    }

    pub fn outfit_labeler(mut self, labeler: Arc<dyn OutfitLabeler>) -> Self {
        self.outfit_labeler = Some(labeler);
        self
    }

    pub fn session_verifier(mut self, verifier: Arc<dyn SessionVerifier>) -> Self {
        self.session_verifier = Some(verifier);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub async fn build(self) -> TestApp {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut env = HashMap::from([
            (
                "UPLOAD_DIR".to_string(),
                temp_dir.path().display().to_string(),
            ),
            ("PUBLIC_BASE_URL".to_string(), "http://localhost:5000".to_string()),
            ("OUTFIT_ANALYZER".to_string(), "none".to_string()),
            ("UPLOAD_RETENTION_SECS".to_string(), "0".to_string()),
        ]);
        env.extend(self.env);
        let config = Config::from_lookup(|key| env.get(key).cloned()).expect("Invalid test config");

        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(config.upload_dir.clone(), uploads_base_url(&config))
                .await
                .expect("Failed to create local storage"),
        );

        let state = Arc::new(AppState {
            config: config.clone(),
            catalog: Arc::new(Catalog::embedded().expect("Embedded catalog must load")),
            storage,
            skin_tone_detector: self.skin_tone_detector,
            outfit_labeler: self.outfit_labeler,
            session_verifier: self.session_verifier,
            started_at: Instant::now(),
        });

        let app = routes::setup_routes(&config, state.clone()).expect("Failed to build router");
        let server = TestServer::new(app).expect("Failed to create test server");

        TestApp {
            server,
            state,
            _temp_dir: temp_dir,
        }
    }
}

/// Setup a test app with stub analyzers and no session guard.
pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build().await
}

/// Multipart form carrying one PNG under `field`.
pub fn image_form(field: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from_static(TEST_PNG))
        .file_name("selfie.png")
        .mime_type("image/png");
    MultipartForm::new().add_part(field.to_string(), part)
}
