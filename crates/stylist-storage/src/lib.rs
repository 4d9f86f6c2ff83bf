//! Stylist Storage Library
//!
//! Storage abstraction for uploaded images and its local filesystem
//! implementation.
//!
//! # Storage key format
//!
//! Every stored file gets a flat key of the form
//! `{timestamp_ms}-{8 hex chars}-{sanitized original name}`. Keys never
//! contain path separators, `..` or a leading `/`. Key generation lives in the
//! `keys` module.

pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::sanitize_filename;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
