pub mod catalog;
pub mod outfit;
pub mod recommendations;
pub mod skin_tone;
pub mod upload;

use stylist_analyzers::AnalyzerError;
use stylist_core::AppError;

/// Map an analyzer failure onto the HTTP error taxonomy.
///
/// `failure` is reported for transport/process failures (502), `parse` for
/// output that could not be understood (500).
pub(crate) fn analyzer_failure(err: AnalyzerError, failure: &str, parse: &str) -> AppError {
    match err {
        AnalyzerError::InvalidImage(msg) => {
            AppError::InvalidInput(format!("Uploaded file is not a readable image: {}", msg))
        }
        err if err.is_parse() => AppError::Parse {
            message: parse.to_string(),
            source: err.into(),
        },
        err => AppError::Upstream {
            message: failure.to_string(),
            source: err.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stylist_core::ErrorMetadata;

    #[test]
    fn test_analyzer_failure_mapping() {
        let cases = [
            (AnalyzerError::Spawn("no python3".into()), 502),
            (AnalyzerError::Failed("exit status 1".into()), 502),
            (AnalyzerError::Timeout(Duration::from_secs(60)), 502),
            (AnalyzerError::Request("HTTP 500".into()), 502),
            (AnalyzerError::MalformedOutput("expected 5 fields".into()), 500),
            (AnalyzerError::InvalidImage("not a png".into()), 400),
        ];

        for (err, status) in cases {
            let app = analyzer_failure(err, "Failed to detect skin tone", "Failed to parse skin tone data");
            assert_eq!(app.http_status_code(), status, "{:?}", app);
        }
    }

    #[test]
    fn test_analyzer_failure_messages() {
        let app = analyzer_failure(
            AnalyzerError::MalformedOutput("garbage".into()),
            "Failed to detect skin tone",
            "Failed to parse skin tone data",
        );
        assert_eq!(app.client_message(), "Failed to parse skin tone data");
        assert!(app.detailed_message().contains("garbage"));
    }
}
