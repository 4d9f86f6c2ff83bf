mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use helpers::stubs::{StubOutfitLabeler, StubSkinToneDetector};
use helpers::{image_form, setup_test_app, TestAppBuilder, TEST_PNG};
use serde_json::Value;
use stylist_core::Catalog;

#[tokio::test]
async fn test_upload_stores_file_and_serves_it() {
    let app = setup_test_app().await;

    let response = app.client().post("/upload").multipart(image_form("file")).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "File uploaded successfully");

    let file_path = body["filePath"].as_str().unwrap();
    assert!(std::path::Path::new(file_path).is_file());
    assert!(file_path.starts_with(app.upload_dir().to_str().unwrap()));

    let file_url = body["fileUrl"].as_str().unwrap();
    assert!(file_url.starts_with("http://localhost:5000/uploads/"));
    assert!(file_url.ends_with("selfie.png"));

    let served_path = file_url.trim_start_matches("http://localhost:5000");
    let served = app.client().get(served_path).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().as_ref(), TEST_PNG);
}

#[tokio::test]
async fn test_upload_accepts_image_field_name() {
    let app = setup_test_app().await;

    let response = app.client().post("/upload").multipart(image_form("image")).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.stored_files().len(), 1);
}

#[tokio::test]
async fn test_upload_sanitizes_filename() {
    let app = setup_test_app().await;
    let part = Part::bytes(Bytes::from_static(TEST_PNG))
        .file_name("../../etc/my photo.png")
        .mime_type("image/png");

    let response = app
        .client()
        .post("/upload")
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let file_url = body["fileUrl"].as_str().unwrap();
    assert!(file_url.ends_with("my_photo.png"));
    assert!(!file_url.contains(".."));
}

#[tokio::test]
async fn test_upload_accepts_repeated_dots_in_filename() {
    let app = setup_test_app().await;
    let part = Part::bytes(Bytes::from_static(TEST_PNG))
        .file_name("my..photo.png")
        .mime_type("image/png");

    let response = app
        .client()
        .post("/upload")
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let file_path = body["filePath"].as_str().unwrap();
    assert!(file_path.ends_with("-my.photo.png"));
    assert!(!file_path.contains(".."));
    assert_eq!(app.stored_files().len(), 1);
}

#[tokio::test]
async fn test_upload_without_file_is_400() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_text("note", "no file here");

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file uploaded");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_two_files() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_part("file", Part::bytes(Bytes::from_static(TEST_PNG)).file_name("a.png"))
        .add_part("image", Part::bytes(Bytes::from_static(TEST_PNG)).file_name("b.png"));

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_over_size_limit_is_413() {
    let app = TestAppBuilder::default()
        .env("MAX_UPLOAD_SIZE_MB", "1")
        .build()
        .await;
    let part = Part::bytes(Bytes::from(vec![0u8; 2 * 1024 * 1024])).file_name("huge.png");

    let response = app
        .client()
        .post("/upload")
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_detect_skintone_without_image_skips_detector() {
    let detector = StubSkinToneDetector::returning("Fair", (255, 224, 196), "#FFE0C4");
    let app = TestAppBuilder::default()
        .skin_tone_detector(detector.clone())
        .build()
        .await;

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(MultipartForm::new().add_text("image", "not a file"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No image uploaded");
    assert_eq!(detector.log.calls(), 0);
}

#[tokio::test]
async fn test_detect_skintone_enriches_reading_and_removes_upload() {
    let detector = StubSkinToneDetector::returning("Olive", (170, 130, 90), "#aa825a");
    let app = TestAppBuilder::default()
        .skin_tone_detector(detector.clone())
        .build()
        .await;

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["skinTone"], "Olive");
    assert_eq!(body["rgb"]["r"], 170);
    assert_eq!(body["hex"], "#aa825a");

    let catalog = Catalog::embedded().unwrap();
    let expected = serde_json::to_value(catalog.skin_tone("Olive")).unwrap();
    assert_eq!(body["recommendations"], expected);

    let seen = detector.log.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1, "file must exist while the detector runs");
    assert!(!seen[0].0.exists(), "file must be removed afterwards");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_detect_skintone_accepts_repeated_dots_in_filename() {
    let detector = StubSkinToneDetector::returning("Fair", (255, 224, 196), "#FFE0C4");
    let app = TestAppBuilder::default()
        .skin_tone_detector(detector.clone())
        .build()
        .await;
    let part = Part::bytes(Bytes::from_static(TEST_PNG))
        .file_name("selfie..jpg")
        .mime_type("image/jpeg");

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(MultipartForm::new().add_part("image", part))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(detector.log.calls(), 1);
    let seen = detector.log.seen();
    assert!(seen[0].0.to_string_lossy().ends_with("-selfie.jpg"));
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_unknown_skin_tone_label_uses_fallback() {
    let detector = StubSkinToneDetector::returning("Golden", (200, 160, 120), "#c8a078");
    let app = TestAppBuilder::default()
        .skin_tone_detector(detector)
        .build()
        .await;

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(image_form("file"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["skinTone"], "Golden");

    let catalog = Catalog::embedded().unwrap();
    let fallback = serde_json::to_value(catalog.skin_tone_fallback()).unwrap();
    assert_eq!(body["recommendations"], fallback);
}

#[tokio::test]
async fn test_detector_failure_is_502_and_upload_removed() {
    let detector = StubSkinToneDetector::failing();
    let app = TestAppBuilder::default()
        .skin_tone_detector(detector.clone())
        .build()
        .await;

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to detect skin tone");
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert_eq!(detector.log.calls(), 1);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_malformed_detector_output_is_500() {
    let app = TestAppBuilder::default()
        .skin_tone_detector(StubSkinToneDetector::malformed())
        .build()
        .await;

    let response = app
        .client()
        .post("/detect-skintone")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to parse skin tone data");
    assert!(app.stored_files().is_empty());
}

#[cfg(unix)]
mod script_detector {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use stylist_analyzers::ScriptSkinToneDetector;

    fn write_script(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("detect.sh");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_script_output_is_relayed() {
        let scripts = tempfile::TempDir::new().unwrap();
        let script = write_script(
            &scripts,
            "echo 'loading model'\necho 'Fair,255,224,196,#FFE0C4'\n",
        );
        let detector = Arc::new(ScriptSkinToneDetector::new(
            "sh".to_string(),
            script,
            Duration::from_secs(10),
        ));
        let app = TestAppBuilder::default()
            .skin_tone_detector(detector)
            .build()
            .await;

        let response = app
            .client()
            .post("/detect-skintone")
            .multipart(image_form("image"))
            .await;

        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(body["skinTone"], "Fair");
        assert_eq!(body["rgb"], serde_json::json!({ "r": 255, "g": 224, "b": 196 }));
        assert_eq!(body["hex"], "#FFE0C4");

        let catalog = Catalog::embedded().unwrap();
        let fair = serde_json::to_value(catalog.skin_tone("Fair")).unwrap();
        assert_eq!(body["recommendations"], fair);
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_script_failure_is_502() {
        let scripts = tempfile::TempDir::new().unwrap();
        let script = write_script(&scripts, "echo 'Could not read image' >&2\nexit 1\n");
        let detector = Arc::new(ScriptSkinToneDetector::new(
            "sh".to_string(),
            script,
            Duration::from_secs(10),
        ));
        let app = TestAppBuilder::default()
            .skin_tone_detector(detector)
            .build()
            .await;

        let response = app
            .client()
            .post("/detect-skintone")
            .multipart(image_form("image"))
            .await;

        assert_eq!(response.status_code(), 502);
        let body: Value = response.json();
        assert!(!body["error"].as_str().unwrap().contains("Could not read image"));
        assert!(app.stored_files().is_empty());
    }
}

#[tokio::test]
async fn test_analyze_outfit_without_analyzer_is_503() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/analyze-outfit")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_analyze_outfit_returns_labels() {
    let labeler = StubOutfitLabeler::returning(&["jacket", "jeans"]);
    let app = TestAppBuilder::default()
        .outfit_labeler(labeler.clone())
        .build()
        .await;

    let response = app
        .client()
        .post("/analyze-outfit")
        .multipart(image_form("file"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["analyzer"], "stub");
    assert_eq!(body["labels"], serde_json::json!(["jacket", "jeans"]));
    assert_eq!(labeler.log.calls(), 1);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_analyze_outfit_empty_labels_become_hints() {
    let app = TestAppBuilder::default()
        .outfit_labeler(StubOutfitLabeler::returning(&[]))
        .build()
        .await;

    let response = app
        .client()
        .post("/analyze-outfit")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let labels = body["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0], "No recommendations found. Try using a clearer image.");
    assert_eq!(labels[1], "Ensure clothing is visible and well-lit in the image.");
}

#[tokio::test]
async fn test_analyze_outfit_failure_is_502() {
    let labeler = StubOutfitLabeler::failing();
    let app = TestAppBuilder::default()
        .outfit_labeler(labeler.clone())
        .build()
        .await;

    let response = app
        .client()
        .post("/analyze-outfit")
        .multipart(image_form("image"))
        .await;

    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to analyze outfit");
    assert_eq!(labeler.log.calls(), 1);
    assert!(app.stored_files().is_empty());
}
