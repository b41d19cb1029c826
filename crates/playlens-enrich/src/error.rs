//! Enrichment error types.

use std::time::Duration;

use thiserror::Error;

use crate::enrich::resilience::parse_retry_after;

/// Errors that can occur while talking to providers or assembling a
/// playlist.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// A request to an external source failed before a response arrived.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// An external source answered with a non-success status.
    #[error("{source_name} returned status {status}")]
    Status {
        source_name: String,
        status: u16,
        /// Parsed `Retry-After` header, when the source sent one.
        retry_after: Option<Duration>,
    },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// No catalog access token could be obtained.
    #[error("failed to obtain catalog token: {message}")]
    Token { message: String },

    /// The playlist exists but cannot be read with app credentials.
    #[error("playlist is private or restricted (status {status})")]
    Restricted { status: u16 },

    /// The playlist has no track entries.
    #[error("no tracks found in the playlist")]
    EmptyPlaylist,

    /// A playlist entry is missing data required to build a record.
    #[error("invalid track entry: {0}")]
    InvalidTrack(String),

    /// An error propagated from the core domain layer.
    #[error("record error: {0}")]
    Core(#[from] playlens_core::Error),

    /// A spawned track task panicked or was cancelled.
    #[error("track task failed: {0}")]
    Task(String),
}

impl EnrichError {
    /// Build a [`EnrichError::Status`] from a non-success response.
    pub fn from_response(source_name: &str, response: &reqwest::Response) -> Self {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);

        Self::Status {
            source_name: source_name.to_string(),
            status: response.status().as_u16(),
            retry_after,
        }
    }

    /// The upstream HTTP status, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Restricted { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the error is a rate limit or a transient server
    /// failure and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: 429 | 500 | 502 | 503 | 504,
                ..
            }
        )
    }

    /// Returns `true` for authorization-class statuses (401/403).
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Convenience alias for enrichment results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> EnrichError {
        EnrichError::Status {
            source_name: "Spotify".to_string(),
            status: code,
            retry_after: None,
        }
    }

    #[test]
    fn test_transient_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(status(code).is_transient(), "{code} should be transient");
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!status(code).is_transient(), "{code} should not be transient");
        }
    }

    #[test]
    fn test_non_status_errors_are_not_transient() {
        let err = EnrichError::Http {
            source_name: "Spotify".to_string(),
            message: "connection reset".to_string(),
        };
        assert!(!err.is_transient());
        assert!(err.status().is_none());
    }

    #[test]
    fn test_auth_statuses() {
        assert!(status(401).is_auth());
        assert!(status(403).is_auth());
        assert!(EnrichError::Restricted { status: 403 }.is_auth());
        assert!(!status(404).is_auth());
    }

    #[test]
    fn test_core_error_converts() {
        let err: EnrichError = playlens_core::Error::InvalidData("mismatch".to_string()).into();
        assert!(matches!(err, EnrichError::Core(_)));
        assert_eq!(err.to_string(), "record error: invalid data: mismatch");
        assert!(err.status().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(status(503).to_string(), "Spotify returned status 503");
        assert_eq!(
            EnrichError::EmptyPlaylist.to_string(),
            "no tracks found in the playlist"
        );
    }
}
