//! Stylist HTTP API
//!
//! Axum server exposing the outfit recommendation lookups, image upload,
//! skin-tone detection and outfit analysis endpoints.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
