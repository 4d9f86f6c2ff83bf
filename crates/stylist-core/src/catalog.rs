//! Recommendation catalog
//!
//! The catalog holds every static table the service answers from: the three
//! category axes, the skin-tone advice table and its fallback record. It is
//! parsed once at startup and shared read-only.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{
    CategoryAxis, CategoryEntry, CategorySummary, SkinToneEntry, SkinToneRecord,
};

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    body_shapes: Vec<CategoryEntry>,
    occasions: Vec<CategoryEntry>,
    weather: Vec<CategoryEntry>,
    skin_tones: Vec<SkinToneEntry>,
    skin_tone_fallback: SkinToneRecord,
}

impl Catalog {
    /// Catalog compiled into the binary.
    pub fn embedded() -> Result<Self, anyhow::Error> {
        Self::from_json(EMBEDDED_CATALOG).context("Failed to load embedded catalog")
    }

    /// Load a catalog document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to load catalog file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self, anyhow::Error> {
        let catalog: Catalog =
            serde_json::from_str(raw).context("Failed to parse catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the structural invariants every table must hold.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for axis in CategoryAxis::ALL {
            let entries = self.entries(axis);
            if entries.is_empty() {
                anyhow::bail!("Catalog table for {} is empty", axis);
            }

            let mut seen = HashSet::new();
            for entry in entries {
                if entry.key.trim().is_empty() {
                    anyhow::bail!("Catalog table for {} contains an empty key", axis);
                }
                if !seen.insert(entry.key.to_lowercase()) {
                    anyhow::bail!("Duplicate {} key in catalog: {}", axis, entry.key);
                }
                if entry.recommendations.is_empty() {
                    anyhow::bail!("Catalog {} '{}' has no recommendations", axis, entry.key);
                }
            }
        }

        if self.skin_tones.is_empty() {
            anyhow::bail!("Catalog skin tone table is empty");
        }
        let mut seen = HashSet::new();
        for tone in &self.skin_tones {
            if !seen.insert(tone.label.to_lowercase()) {
                anyhow::bail!("Duplicate skin tone label in catalog: {}", tone.label);
            }
        }

        Ok(())
    }

    /// Entries of one axis in declaration order.
    pub fn entries(&self, axis: CategoryAxis) -> &[CategoryEntry] {
        match axis {
            CategoryAxis::BodyShape => &self.body_shapes,
            CategoryAxis::Occasion => &self.occasions,
            CategoryAxis::Weather => &self.weather,
        }
    }

    pub fn keys(&self, axis: CategoryAxis) -> Vec<&str> {
        self.entries(axis).iter().map(|e| e.key.as_str()).collect()
    }

    pub fn summaries(&self, axis: CategoryAxis) -> Vec<CategorySummary> {
        self.entries(axis).iter().map(CategorySummary::from).collect()
    }

    /// Find the entry for `key` on `axis`.
    ///
    /// The key is trimmed and compared ignoring ASCII case. An absent or blank
    /// key is a missing field; a key outside the table is an invalid selection.
    pub fn lookup(&self, axis: CategoryAxis, key: Option<&str>) -> Result<&CategoryEntry, AppError> {
        let key = key.map(str::trim).unwrap_or("");
        if key.is_empty() {
            return Err(AppError::MissingField(axis.required_label().to_string()));
        }

        self.entries(axis)
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
            .ok_or_else(|| AppError::invalid_selection(axis.to_string(), key))
    }

    pub fn skin_tone_labels(&self) -> Vec<&str> {
        self.skin_tones.iter().map(|t| t.label.as_str()).collect()
    }

    /// Styling advice for a detected label. Exact match first, then
    /// case-insensitive, then the fallback record.
    pub fn skin_tone(&self, label: &str) -> &SkinToneRecord {
        let label = label.trim();
        self.skin_tones
            .iter()
            .find(|t| t.label == label)
            .or_else(|| {
                self.skin_tones
                    .iter()
                    .find(|t| t.label.eq_ignore_ascii_case(label))
            })
            .map(|t| &t.record)
            .unwrap_or(&self.skin_tone_fallback)
    }

    pub fn skin_tone_fallback(&self) -> &SkinToneRecord {
        &self.skin_tone_fallback
    }
}
