//! Error types for the scene generation pipeline.

use std::time::Duration;

/// Errors that can occur while generating or stitching scenes.
#[derive(Debug, thiserror::Error)]
pub enum StoryReelError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The remote service rejected or failed to start a generation job.
    #[error("submission failed: {0}")]
    Submission(String),

    /// Polling exhausted its attempt budget with the job still pending.
    #[error("generation still pending after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    /// A terminal job carried no usable payload.
    #[error("result extraction failed: {0}")]
    Extraction(String),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving a clip).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The external concatenation tool reported failure.
    #[error("concatenation failed: {0}")]
    Concat(String),
}

impl StoryReelError {
    /// Returns true if this error aborts the whole run rather than one scene.
    ///
    /// Per-scene errors (submission, timeout, extraction, network) are
    /// recorded and the run proceeds to the next prompt. Only a failing
    /// concatenation is fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Concat(_))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, StoryReelError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Reduce a raw error body to something fit for an error message.
///
/// Pulls `error.message` out of a JSON body when present, then truncates.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.len() > MAX_ERROR_MESSAGE_LEN {
        let mut end = MAX_ERROR_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &message[..end])
    } else {
        message
    }
}

/// Parse a `Retry-After` header value as whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fatal() {
        assert!(StoryReelError::Concat("ffmpeg exited with code 1".into()).is_fatal());

        assert!(!StoryReelError::Auth("bad key".into()).is_fatal());
        assert!(!StoryReelError::Submission("missing handle".into()).is_fatal());
        assert!(!StoryReelError::Timeout { attempts: 60 }.is_fatal());
        assert!(!StoryReelError::Extraction("no payload".into()).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = StoryReelError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = StoryReelError::Timeout { attempts: 60 };
        assert_eq!(
            err.to_string(),
            "generation still pending after 60 poll attempts"
        );
    }

    #[test]
    fn test_sanitize_extracts_json_message() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(sanitize_error_message(body), "Quota exceeded");
    }

    #[test]
    fn test_sanitize_falls_back_to_raw_body() {
        assert_eq!(sanitize_error_message("  plain text  "), "plain text");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let sanitized = sanitize_error_message(&body);
        assert!(sanitized.len() <= MAX_ERROR_MESSAGE_LEN + 3);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));
    }
}
