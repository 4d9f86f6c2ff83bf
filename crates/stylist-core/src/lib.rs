//! Stylist Core Library
//!
//! Configuration, error types, domain models and the recommendation catalog
//! shared by every stylist crate.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::{Config, OutfitAnalyzerKind, SkinToneDetectorKind};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CategoryAxis, CategoryEntry, CategoryInfo, CategorySummary, RecommendationRecord, Rgb,
    SkinToneEntry, SkinToneReading, SkinToneRecord, UploadedImage,
};
