use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ids::{AlbumId, ArtistId};

/// Representative artist image used when the first credited artist has none.
pub const PLACEHOLDER_ARTIST_IMAGE: &str = "https://placehold.co/200x200?text=No+Artist+Image";

/// Which provider a lyrics link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LyricsSource {
    /// Matched through the lyrics-search provider.
    #[serde(rename = "genius")]
    Primary,
    /// A constructed web-search URL.
    #[serde(rename = "google")]
    Fallback,
}

/// A best-effort link to a lyrics page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsRef {
    #[serde(rename = "lyricsUrl")]
    pub url: Option<String>,
    #[serde(rename = "lyricsSource")]
    pub source: LyricsSource,
}

impl LyricsRef {
    #[must_use]
    pub fn primary(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            source: LyricsSource::Primary,
        }
    }

    #[must_use]
    pub fn fallback(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            source: LyricsSource::Fallback,
        }
    }
}

/// Artwork attached to a track. Every image is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSet {
    /// Track image; the catalog only exposes album artwork for this.
    pub image: Option<String>,
    pub album_image: Option<String>,
    /// Image of the first credited artist, or [`PLACEHOLDER_ARTIST_IMAGE`].
    pub artist_image: Option<String>,
    /// Per-artist images keyed by artist id.
    pub artist_images: BTreeMap<ArtistId, Option<String>>,
}

/// One enriched playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    #[serde(rename = "track")]
    pub title: String,
    pub artists: Vec<String>,
    pub artist_joined: String,
    pub artist_ids: Vec<ArtistId>,
    pub album: String,
    pub album_id: Option<AlbumId>,
    pub year: String,
    /// Comma-joined canonical genres, or `"Unknown"`.
    pub genre: String,
    #[serde(flatten)]
    pub lyrics: LyricsRef,
    #[serde(flatten)]
    pub artwork: ArtworkSet,
}

impl TrackRecord {
    /// Check the structural invariants of the record.
    ///
    /// `artists` and `artist_ids` must line up one-to-one, and every key
    /// of `artist_images` must be one of the credited artist ids.
    pub fn validate(&self) -> Result<()> {
        if self.artists.len() != self.artist_ids.len() {
            return Err(Error::InvalidData(format!(
                "track '{}' has {} artist names but {} artist ids",
                self.title,
                self.artists.len(),
                self.artist_ids.len()
            )));
        }

        if let Some(stray) = self
            .artwork
            .artist_images
            .keys()
            .find(|id| !self.artist_ids.contains(id))
        {
            return Err(Error::InvalidData(format!(
                "track '{}' has an image for uncredited artist {stray}",
                self.title
            )));
        }

        Ok(())
    }

    /// Cache key shared by every playlist containing this track:
    /// `title + "__" + comma-joined artist names`.
    #[must_use]
    pub fn cache_key(title: &str, artist_names: &[String]) -> String {
        format!("{title}__{}", artist_names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackRecord {
        let mut artist_images = BTreeMap::new();
        artist_images.insert(ArtistId::new("a1"), Some("https://img/a1".to_string()));

        TrackRecord {
            title: "Song".into(),
            artists: vec!["Artist".into()],
            artist_joined: "Artist".into(),
            artist_ids: vec![ArtistId::new("a1")],
            album: "Album".into(),
            album_id: Some(AlbumId::new("al1")),
            year: "2020".into(),
            genre: "k-pop".into(),
            lyrics: LyricsRef::primary("https://genius.com/song"),
            artwork: ArtworkSet {
                image: Some("https://img/album".into()),
                album_image: Some("https://img/album".into()),
                artist_image: Some("https://img/a1".into()),
                artist_images,
            },
        }
    }

    #[test]
    fn test_validate_accepts_consistent_record() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut record = sample();
        record.artists.push("Another".into());
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_stray_image_key() {
        let mut record = sample();
        record
            .artwork
            .artist_images
            .insert(ArtistId::new("zz"), None);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_cache_key_format() {
        let key = TrackRecord::cache_key("Song", &["A".to_string(), "B".to_string()]);
        assert_eq!(key, "Song__A,B");
        assert_eq!(TrackRecord::cache_key("Solo", &[]), "Solo__");
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["track"], "Song");
        assert_eq!(value["artistJoined"], "Artist");
        assert_eq!(value["artistIds"][0], "a1");
        assert_eq!(value["albumId"], "al1");
        assert_eq!(value["lyricsUrl"], "https://genius.com/song");
        assert_eq!(value["lyricsSource"], "genius");
        assert_eq!(value["albumImage"], "https://img/album");
        assert_eq!(value["artistImages"]["a1"], "https://img/a1");
    }

    #[test]
    fn test_fallback_source_serializes_as_google() {
        let lyrics = LyricsRef::fallback("https://www.google.com/search?q=x");
        let value = serde_json::to_value(&lyrics).unwrap();
        assert_eq!(value["lyricsSource"], "google");
    }
}
