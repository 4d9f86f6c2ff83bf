//! In-memory analyzers that record what they were asked to analyze.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stylist_analyzers::{AnalyzerError, OutfitLabeler, SkinToneDetector};
use stylist_core::{Rgb, SkinToneReading, UploadedImage};

enum Outcome<T> {
    Ok(T),
    Failed,
    Malformed,
}

/// Calls seen by a stub: the stored path and whether it existed at call time.
#[derive(Default)]
pub struct CallLog {
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl CallLog {
    fn record(&self, image: &UploadedImage) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((image.path.clone(), image.path.is_file()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

pub struct StubSkinToneDetector {
    outcome: Outcome<SkinToneReading>,
    pub log: CallLog,
}

impl StubSkinToneDetector {
    pub fn returning(label: &str, rgb: (u8, u8, u8), hex: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Ok(SkinToneReading {
                label: label.to_string(),
                rgb: Rgb::new(rgb.0, rgb.1, rgb.2),
                hex: hex.to_string(),
            }),
            log: CallLog::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Failed,
            log: CallLog::default(),
        })
    }

    pub fn malformed() -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Malformed,
            log: CallLog::default(),
        })
    }
}

#[async_trait]
impl SkinToneDetector for StubSkinToneDetector {
    fn name(&self) -> &str {
        "stub"
    }

    async fn detect(&self, image: &UploadedImage) -> Result<SkinToneReading, AnalyzerError> {
        self.log.record(image);
        match &self.outcome {
            Outcome::Ok(reading) => Ok(reading.clone()),
            Outcome::Failed => Err(AnalyzerError::Failed("exit status: 1".to_string())),
            Outcome::Malformed => Err(AnalyzerError::MalformedOutput("Warming up".to_string())),
        }
    }
}

pub struct StubOutfitLabeler {
    outcome: Outcome<Vec<String>>,
    pub log: CallLog,
}

impl StubOutfitLabeler {
    pub fn returning(labels: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Ok(labels.iter().map(|l| l.to_string()).collect()),
            log: CallLog::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Failed,
            log: CallLog::default(),
        })
    }
}

#[async_trait]
impl OutfitLabeler for StubOutfitLabeler {
    fn name(&self) -> &str {
        "stub"
    }

    async fn label(&self, image: &UploadedImage) -> Result<Vec<String>, AnalyzerError> {
        self.log.record(image);
        match &self.outcome {
            Outcome::Ok(labels) => Ok(labels.clone()),
            Outcome::Failed => Err(AnalyzerError::Request("HTTP 500".to_string())),
            Outcome::Malformed => Err(AnalyzerError::MalformedOutput("no output".to_string())),
        }
    }
}
