//! Shared constants

/// FashionCLIP model version on Replicate.
pub const DEFAULT_REPLICATE_MODEL_VERSION: &str =
    "75b33f253f7714a281ad3e9b28f63e3232d583716ef6718f2e46641077ea040a";

pub const DEFAULT_REPLICATE_API_BASE: &str = "https://api.replicate.com/v1";

pub const DEFAULT_CANDIDATE_LABELS: &str =
    "dress, jeans, jacket, shorts, blazer, coat, sneakers, heels, formal, casual";

/// Public keys used to sign Firebase ID tokens.
pub const DEFAULT_SESSION_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Hint lines returned when an outfit analyzer finds nothing.
pub const EMPTY_LABEL_HINTS: [&str; 2] = [
    "No recommendations found. Try using a clearer image.",
    "Ensure clothing is visible and well-lit in the image.",
];
