//! Storage key generation

use chrono::Utc;
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 100;
const FALLBACK_FILENAME: &str = "upload";

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory components are dropped and every character outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let mut sanitized = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        // Keys may never contain "..", so runs of dots collapse to one.
        if c == '.' && sanitized.ends_with('.') {
            continue;
        }
        sanitized.push(c);
    }

    // A name made only of dots would resolve to the directory itself.
    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    // Keep the tail so the extension survives truncation.
    let chars: Vec<char> = sanitized.chars().collect();
    if chars.len() > MAX_FILENAME_LEN {
        chars[chars.len() - MAX_FILENAME_LEN..].iter().collect()
    } else {
        sanitized.to_string()
    }
}

/// Generate a unique storage key for an uploaded file.
pub(crate) fn generate_key(original_filename: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &random[..8],
        sanitize_filename(original_filename)
    )
}
