use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// Genre label used when no genre could be resolved.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// An artist credit as it appears on a catalog track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Catalog id. Absent for local files and some podcast entries.
    #[serde(default)]
    pub id: Option<ArtistId>,
    #[serde(default)]
    pub name: String,
}

impl ArtistRef {
    #[must_use]
    pub fn new(id: impl Into<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// The id, if present and non-blank.
    #[must_use]
    pub fn resolvable_id(&self) -> Option<&ArtistId> {
        self.id.as_ref().filter(|id| !id.is_empty())
    }
}

/// A successfully resolved artist, as held in the artist cache.
///
/// Only created after a catalog lookup succeeded; `genres` may still be
/// empty when neither the catalog nor the tag fallback knew any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub image: Option<String>,
    /// Canonical genre tags, at most three, in source order.
    pub genres: Vec<String>,
}

impl ArtistProfile {
    #[must_use]
    pub fn new(image: Option<String>, genres: Vec<String>) -> Self {
        Self { image, genres }
    }

    /// Comma-joined genres, or [`UNKNOWN_GENRE`] when there are none.
    #[must_use]
    pub fn genre_label(&self) -> String {
        if self.genres.is_empty() {
            UNKNOWN_GENRE.to_string()
        } else {
            self.genres.join(", ")
        }
    }

    #[must_use]
    pub fn to_info(&self) -> ArtistInfo {
        ArtistInfo {
            image: self.image.clone(),
            genre_label: self.genre_label(),
        }
    }
}

/// What artist resolution hands back to a track pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub image: Option<String>,
    pub genre_label: String,
}

impl ArtistInfo {
    /// The safe default used for id-less artists and failed lookups.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            image: None,
            genre_label: UNKNOWN_GENRE.to_string(),
        }
    }

    /// Individual genre tags from the label, excluding the unknown sentinel.
    pub fn genre_tags(&self) -> impl Iterator<Item = &str> {
        self.genre_label
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != UNKNOWN_GENRE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_genre_label_joins() {
        let profile = ArtistProfile::new(None, vec!["k-pop".into(), "dance pop".into()]);
        assert_eq!(profile.genre_label(), "k-pop, dance pop");
    }

    #[test]
    fn test_profile_genre_label_unknown_when_empty() {
        let profile = ArtistProfile::new(Some("https://img/1".into()), Vec::new());
        assert_eq!(profile.genre_label(), UNKNOWN_GENRE);
        assert_eq!(profile.to_info().image.as_deref(), Some("https://img/1"));
    }

    #[test]
    fn test_info_genre_tags_skip_sentinel() {
        assert_eq!(ArtistInfo::unknown().genre_tags().count(), 0);

        let info = ArtistInfo {
            image: None,
            genre_label: "hip hop, r&b".to_string(),
        };
        let tags: Vec<&str> = info.genre_tags().collect();
        assert_eq!(tags, vec!["hip hop", "r&b"]);
    }

    #[test]
    fn test_artist_ref_resolvable_id() {
        let blank = ArtistRef {
            id: Some(ArtistId::new("")),
            name: "Local".into(),
        };
        assert!(blank.resolvable_id().is_none());
        assert!(ArtistRef::new("a1", "Someone").resolvable_id().is_some());
    }

    #[test]
    fn test_artist_ref_deserialize_without_id() {
        let artist: ArtistRef = serde_json::from_str(r#"{"name": "Local Band"}"#).unwrap();
        assert!(artist.id.is_none());
        assert_eq!(artist.name, "Local Band");
    }
}
