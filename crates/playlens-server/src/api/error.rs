//! Mapping from pipeline errors to HTTP responses.
//!
//! Responses carry only a user-facing `{ "error": ... }` message; the
//! underlying error is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use playlens_enrich::EnrichError;

pub const RESTRICTED_MESSAGE: &str = "Playlist is private or from an official Spotify account. \
     Make sure it's a public user-created playlist.";
pub const TOKEN_MESSAGE: &str = "Failed to obtain Spotify token";
pub const EMPTY_MESSAGE: &str = "No tracks found in the playlist";
pub const UNEXPECTED_MESSAGE: &str = "Unexpected error fetching playlist. Please try again later.";

/// Error returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The playlist has no entries (400).
    EmptyPlaylist,
    /// The catalog refused access to the playlist (401/403).
    Restricted(u16),
    /// The catalog answered with another non-success status (500).
    Upstream(u16),
    /// No catalog token could be obtained (500).
    Token,
    /// Anything else (500).
    Unexpected,
}

impl From<EnrichError> for ApiError {
    fn from(err: EnrichError) -> Self {
        error!("Playlist request failed: {}", err);
        match err {
            EnrichError::EmptyPlaylist => Self::EmptyPlaylist,
            EnrichError::Restricted { status } => Self::Restricted(status),
            EnrichError::Status { status, .. } => Self::Upstream(status),
            EnrichError::Token { .. } => Self::Token,
            _ => Self::Unexpected,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::EmptyPlaylist => (StatusCode::BAD_REQUEST, EMPTY_MESSAGE.to_string()),
            ApiError::Restricted(code) => (
                StatusCode::from_u16(code).unwrap_or(StatusCode::FORBIDDEN),
                RESTRICTED_MESSAGE.to_string(),
            ),
            ApiError::Upstream(code) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Spotify API error: {}", code),
            ),
            ApiError::Token => (StatusCode::INTERNAL_SERVER_ERROR, TOKEN_MESSAGE.to_string()),
            ApiError::Unexpected => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UNEXPECTED_MESSAGE.to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            ApiError::from(EnrichError::EmptyPlaylist),
            ApiError::EmptyPlaylist
        ));
        assert!(matches!(
            ApiError::from(EnrichError::Restricted { status: 401 }),
            ApiError::Restricted(401)
        ));
        assert!(matches!(
            ApiError::from(EnrichError::Token {
                message: "nope".into()
            }),
            ApiError::Token
        ));
        assert!(matches!(
            ApiError::from(EnrichError::Status {
                source_name: "Spotify".into(),
                status: 502,
                retry_after: None,
            }),
            ApiError::Upstream(502)
        ));
        assert!(matches!(
            ApiError::from(EnrichError::Task("panicked".into())),
            ApiError::Unexpected
        ));
    }

    #[test]
    fn test_response_statuses() {
        assert_eq!(
            ApiError::EmptyPlaylist.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Restricted(403).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Restricted(401).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Upstream(404).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
