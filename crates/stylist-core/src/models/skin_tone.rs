//! Skin-tone models

use serde::{Deserialize, Serialize};

/// RGB triple reported by a skin-tone analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Output of a skin-tone analyzer: a category label plus the dominant colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinToneReading {
    pub label: String,
    pub rgb: Rgb,
    /// Relayed as reported by the analyzer.
    pub hex: String,
}

/// Styling advice for a skin tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinToneRecord {
    pub description: String,
    pub colors_to_wear: String,
    pub colors_to_avoid: String,
    pub neutrals: String,
}

/// A labelled skin-tone record as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinToneEntry {
    pub label: String,
    #[serde(flatten)]
    pub record: SkinToneRecord,
}
