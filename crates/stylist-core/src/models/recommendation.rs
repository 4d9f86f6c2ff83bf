//! Recommendation models

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The axis a category key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAxis {
    BodyShape,
    Occasion,
    Weather,
}

impl CategoryAxis {
    pub const ALL: [CategoryAxis; 3] = [
        CategoryAxis::BodyShape,
        CategoryAxis::Occasion,
        CategoryAxis::Weather,
    ];

    /// Name of the request/response field that carries the key.
    pub fn key_field(&self) -> &'static str {
        match self {
            CategoryAxis::BodyShape => "shape",
            CategoryAxis::Occasion => "occasion",
            CategoryAxis::Weather => "weather",
        }
    }

    /// Name of the response field that carries the category info.
    pub fn info_field(&self) -> &'static str {
        match self {
            CategoryAxis::BodyShape => "shapeInfo",
            CategoryAxis::Occasion => "occasionInfo",
            CategoryAxis::Weather => "weatherInfo",
        }
    }

    /// Capitalized field label used in "is required" messages.
    pub fn required_label(&self) -> &'static str {
        match self {
            CategoryAxis::BodyShape => "Shape",
            CategoryAxis::Occasion => "Occasion",
            CategoryAxis::Weather => "Weather",
        }
    }
}

impl Display for CategoryAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CategoryAxis::BodyShape => write!(f, "body shape"),
            CategoryAxis::Occasion => write!(f, "occasion"),
            CategoryAxis::Weather => write!(f, "weather condition"),
        }
    }
}

/// A single hand-authored outfit suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub outfit: String,
    pub color: String,
    pub style: String,
    pub accessories: String,
    pub footwear: String,
    pub description: String,
}

/// Title and blurb shown above a category's recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub title: String,
    pub description: String,
}

/// One category key with its info and ordered recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub info: CategoryInfo,
    pub recommendations: Vec<RecommendationRecord>,
}

/// Summary of a category, used when listing what a table offers.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub title: String,
    pub description: String,
    pub count: usize,
}

impl From<&CategoryEntry> for CategorySummary {
    fn from(entry: &CategoryEntry) -> Self {
        Self {
            key: entry.key.clone(),
            title: entry.info.title.clone(),
            description: entry.info.description.clone(),
            count: entry.recommendations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_fields() {
        assert_eq!(CategoryAxis::BodyShape.key_field(), "shape");
        assert_eq!(CategoryAxis::Occasion.info_field(), "occasionInfo");
        assert_eq!(CategoryAxis::Weather.required_label(), "Weather");
        assert_eq!(CategoryAxis::Weather.to_string(), "weather condition");
    }

    #[test]
    fn test_record_serializes_with_plain_field_names() {
        let record = RecommendationRecord {
            outfit: "Raincoat".to_string(),
            color: "Yellow".to_string(),
            style: "Practical".to_string(),
            accessories: "Umbrella".to_string(),
            footwear: "Rubber boots".to_string(),
            description: "Stays dry.".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        for field in ["outfit", "color", "style", "accessories", "footwear", "description"] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }
}
