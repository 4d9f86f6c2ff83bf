use std::sync::Arc;
use std::time::Instant;

use stylist_analyzers::{OutfitLabeler, SkinToneDetector};
use stylist_core::{Catalog, Config};
use stylist_storage::Storage;

use crate::auth::SessionVerifier;

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub storage: Arc<dyn Storage>,
    pub skin_tone_detector: Arc<dyn SkinToneDetector>,
    /// `None` when `OUTFIT_ANALYZER=none`.
    pub outfit_labeler: Option<Arc<dyn OutfitLabeler>>,
    /// Present only when the session guard is enabled.
    pub session_verifier: Option<Arc<dyn SessionVerifier>>,
    pub started_at: Instant,
}
