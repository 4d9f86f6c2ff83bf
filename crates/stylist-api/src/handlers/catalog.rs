use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use stylist_core::{CategoryAxis, CategorySummary};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    /// Keyed by the request field each axis expects (`shape`, `occasion`, `weather`).
    pub categories: BTreeMap<&'static str, Vec<CategorySummary>>,
    pub skin_tones: Vec<String>,
}

/// List every valid key per axis so clients can build their pickers.
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    let categories = CategoryAxis::ALL
        .iter()
        .map(|axis| (axis.key_field(), state.catalog.summaries(*axis)))
        .collect();

    let skin_tones = state
        .catalog
        .skin_tone_labels()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(CategoriesResponse {
        categories,
        skin_tones,
    })
}
