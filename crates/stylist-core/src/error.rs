//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant
//! describes its own HTTP presentation through `ErrorMetadata`, so the API
//! layer can render any error without matching on it.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_SELECTION")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required request field was absent or empty.
    #[error("{0} is required")]
    MissingField(String),

    /// The request named a category key that is not in the table.
    #[error("Invalid {axis} selected: {key}")]
    InvalidSelection { axis: String, key: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An external analyzer (process or hosted API) failed.
    #[error("Upstream service error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// An external analyzer answered, but its output could not be understood.
    #[error("Malformed upstream output: {message}")]
    Parse {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::MissingField(_) => (400, "MISSING_FIELD", LogLevel::Debug),
        AppError::InvalidSelection { .. } => (400, "INVALID_SELECTION", LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", LogLevel::Debug),
        AppError::ServiceUnavailable(_) => (503, "SERVICE_UNAVAILABLE", LogLevel::Warn),
        AppError::Upstream { .. } => (502, "UPSTREAM_ERROR", LogLevel::Error),
        AppError::Parse { .. } => (500, "UPSTREAM_PARSE_ERROR", LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl AppError {
    /// Shorthand for an invalid category key on the given axis.
    pub fn invalid_selection(axis: impl Into<String>, key: impl Into<String>) -> Self {
        AppError::InvalidSelection {
            axis: axis.into(),
            key: key.into(),
        }
    }

    /// Get the error type name for log output
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingField(_) => "MissingField",
            AppError::InvalidSelection { .. } => "InvalidSelection",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::ServiceUnavailable(_) => "ServiceUnavailable",
            AppError::Upstream { .. } => "Upstream",
            AppError::Parse { .. } => "Parse",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingField(field) => format!("{} is required", field),
            AppError::InvalidSelection { axis, .. } => format!("Invalid {} selected", axis),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::ServiceUnavailable(ref msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Parse { message, .. } => message.clone(),
            AppError::Storage(_) => "Failed to store uploaded file".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400() {
        let missing = AppError::MissingField("Occasion".to_string());
        let invalid = AppError::invalid_selection("occasion", "brunch");
        let input = AppError::InvalidInput("No file uploaded".to_string());

        for err in [&missing, &invalid, &input] {
            assert_eq!(err.http_status_code(), 400);
            assert_eq!(err.log_level(), LogLevel::Debug);
        }
    }

    #[test]
    fn test_missing_and_invalid_messages_differ() {
        let missing = AppError::MissingField("Weather".to_string());
        let invalid = AppError::invalid_selection("weather", "foggy");

        assert_eq!(missing.client_message(), "Weather is required");
        assert_eq!(invalid.client_message(), "Invalid weather selected");
        assert_ne!(missing.error_code(), invalid.error_code());
    }

    #[test]
    fn test_upstream_is_502_and_hides_cause() {
        let err = AppError::Upstream {
            message: "Failed to detect skin tone".to_string(),
            source: anyhow::anyhow!("exit status 1: Could not read image"),
        };
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert_eq!(err.client_message(), "Failed to detect skin tone");
        assert!(err.detailed_message().contains("Could not read image"));
    }

    #[test]
    fn test_parse_is_500() {
        let err = AppError::Parse {
            message: "Failed to parse skin tone data".to_string(),
            source: anyhow::anyhow!("expected 5 fields"),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("disk on fire".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err: AppError = anyhow::anyhow!("secret path /var/x").into();
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.error_type(), "Internal");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AppError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            AppError::Internal(msg) => assert!(msg.contains("denied")),
            other => panic!("Expected Internal variant, got {:?}", other),
        }
    }
}
