use serde::{Deserialize, Serialize};

use crate::model::track::TrackRecord;

/// Playlist name used when the catalog omits one.
pub const DEFAULT_PLAYLIST_NAME: &str = "Unknown Playlist";

/// Cover shown for playlists without artwork.
pub const PLACEHOLDER_COVER: &str = "https://placehold.co/600x600?text=No+Cover";

/// Playlist-level metadata returned alongside the tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub name: String,
    pub image: String,
    pub description: String,
}

impl PlaylistSummary {
    /// Build a summary, substituting defaults for missing fields.
    #[must_use]
    pub fn from_parts(
        name: Option<String>,
        image: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_PLAYLIST_NAME.to_string()),
            image: image
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string()),
            description: description.unwrap_or_default(),
        }
    }
}

/// A track whose enrichment pipeline failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFailure {
    /// Position in the fetched playlist.
    pub index: usize,
    pub track: Option<String>,
    pub message: String,
}

/// The enriched playlist, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistReport {
    #[serde(flatten)]
    pub summary: PlaylistSummary,
    pub tracks: Vec<TrackRecord>,
    /// Only present when failure reporting is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<TrackFailure>>,
}
