//! Data models for the application
//!
//! Organized by domain: category recommendations, skin-tone analysis and
//! uploaded files.

mod recommendation;
mod skin_tone;
mod upload;

pub use recommendation::*;
pub use skin_tone::*;
pub use upload::*;
