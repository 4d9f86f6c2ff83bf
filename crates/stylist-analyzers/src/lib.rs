//! Stylist Analyzers
//!
//! Adapters that turn an uploaded image into a skin-tone reading or a list of
//! outfit labels. Each backing analyzer (local script, in-process pixel
//! analysis, Replicate, Google Cloud Vision) implements one of the two traits
//! in [`analyzer`], so handlers never depend on a concrete transport.

pub mod analyzer;
pub mod builtin;
pub mod factory;
pub mod google_vision;
pub mod replicate;
pub mod script;

// Re-export commonly used types
pub use analyzer::{AnalyzerError, OutfitLabeler, SkinToneDetector};
pub use builtin::BuiltinSkinToneDetector;
pub use factory::{create_outfit_labeler, create_skin_tone_detector};
pub use google_vision::{GoogleVisionConfig, GoogleVisionOutfitLabeler};
pub use replicate::{ReplicateConfig, ReplicateOutfitLabeler};
pub use script::ScriptSkinToneDetector;
