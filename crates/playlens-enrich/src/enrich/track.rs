//! Per-track enrichment.
//!
//! Builds a [`TrackRecord`] from a catalog entry: artist credits are
//! resolved one after another while the lyrics link is resolved
//! concurrently. Finished records are cached by title and artist names.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use playlens_core::model::{
    ArtistId, ArtistRef, ArtworkSet, TrackRecord, PLACEHOLDER_ARTIST_IMAGE, UNKNOWN_GENRE,
};

use crate::catalog::{first_image, CatalogTrack};
use crate::enrich::artist::ArtistEnricher;
use crate::enrich::lyrics::LyricsResolver;
use crate::error::{EnrichError, EnrichResult};

/// Album and year label used when the catalog omits them.
const UNKNOWN_LABEL: &str = "Unknown";

/// What the sequential artist pass produces for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ArtistSummary {
    images: BTreeMap<ArtistId, Option<String>>,
    genres: Vec<String>,
    main_image: String,
}

impl ArtistSummary {
    fn genre_label(&self) -> String {
        if self.genres.is_empty() {
            UNKNOWN_GENRE.to_string()
        } else {
            self.genres.join(", ")
        }
    }
}

/// Enriches catalog tracks into [`TrackRecord`]s.
#[derive(Debug)]
pub struct TrackEnricher {
    artists: ArtistEnricher,
    lyrics: LyricsResolver,
    cache: RwLock<HashMap<String, TrackRecord>>,
}

impl TrackEnricher {
    pub fn new(artists: ArtistEnricher, lyrics: LyricsResolver) -> Self {
        Self {
            artists,
            lyrics,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Enrich one catalog track.
    ///
    /// A cached record for the same title and artist names is returned
    /// unchanged without any provider calls.
    pub async fn enrich(&self, track: &CatalogTrack, token: &str) -> EnrichResult<TrackRecord> {
        let title = track
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| EnrichError::InvalidTrack("track has no name".to_string()))?;

        let credits = track.artists();
        let names: Vec<String> = credits.iter().map(|a| a.name.clone()).collect();
        let key = TrackRecord::cache_key(&title, &names);

        if let Some(record) = self.cache.read().await.get(&key) {
            log::debug!("Track cache hit for '{}'", title);
            return Ok(record.clone());
        }

        let album = track.album.as_ref();
        let album_name = album
            .and_then(|a| a.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        let year = album
            .and_then(|a| a.release_date.as_deref())
            .map(|date| date.chars().take(4).collect::<String>())
            .filter(|year| !year.is_empty())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        let album_image = album.and_then(|a| first_image(a.images.as_deref()));

        let artist_joined = if names.is_empty() {
            UNKNOWN_LABEL.to_string()
        } else {
            names.join(", ")
        };

        let (summary, lyrics) = tokio::join!(
            self.artist_pass(credits, token),
            self.lyrics.resolve(&title, &artist_joined, &album_name)
        );

        let record = TrackRecord {
            genre: summary.genre_label(),
            title,
            artist_ids: credits
                .iter()
                .map(|a| a.id.clone().unwrap_or_else(|| ArtistId::new("")))
                .collect(),
            artists: names,
            artist_joined,
            album: album_name,
            album_id: album.and_then(|a| a.id.clone()),
            year,
            lyrics,
            artwork: ArtworkSet {
                image: album_image.clone(),
                album_image,
                artist_image: Some(summary.main_image),
                artist_images: summary.images,
            },
        };
        record.validate()?;

        self.cache.write().await.insert(key, record.clone());
        Ok(record)
    }

    /// Resolve every credit in order, one at a time.
    async fn artist_pass(&self, credits: &[ArtistRef], token: &str) -> ArtistSummary {
        let mut images = BTreeMap::new();
        let mut genres: Vec<String> = Vec::new();
        let mut main_image = PLACEHOLDER_ARTIST_IMAGE.to_string();

        for (position, credit) in credits.iter().enumerate() {
            let info = self.artists.resolve(credit, token).await;

            if let Some(id) = credit.resolvable_id() {
                images.insert(id.clone(), info.image.clone());
            }
            for genre in info.genre_tags() {
                if !genres.iter().any(|g| g == genre) {
                    genres.push(genre.to_string());
                }
            }
            if position == 0 {
                if let Some(image) = &info.image {
                    main_image.clone_from(image);
                }
            }
        }

        ArtistSummary {
            images,
            genres,
            main_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{CatalogAlbum, CatalogApi, CatalogImage};
    use crate::enrich::lyrics::{LyricsHit, LyricsSearch};
    use crate::enrich::resilience::ArtistSlots;
    use crate::testing::{catalog_track, FakeCatalog, FakeLyrics};
    use playlens_core::model::{AlbumId, LyricsSource};

    fn enricher(catalog: &Arc<FakeCatalog>, lyrics: LyricsResolver) -> TrackEnricher {
        let artists = ArtistEnricher::new(
            Arc::clone(catalog) as Arc<dyn CatalogApi>,
            ArtistSlots::default(),
        );
        TrackEnricher::new(artists, lyrics)
    }

    #[tokio::test]
    async fn test_record_fields() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_artist("a1", Some("https://img/a1"), &["k-pop", "dance pop"])
                .with_artist("a2", None, &["dance pop", "hip hop"]),
        );
        let tracks = enricher(&catalog, LyricsResolver::fallback_only());

        let mut track = catalog_track("Song (Live)", &[("a1", "First"), ("a2", "Second")]);
        track.album = Some(CatalogAlbum {
            id: Some(AlbumId::new("al1")),
            name: Some("Album".into()),
            release_date: Some("2019-06-01".into()),
            images: Some(vec![CatalogImage {
                url: "https://img/al1".into(),
            }]),
        });

        let record = tracks.enrich(&track, "t").await.unwrap();
        assert_eq!(record.title, "Song (Live)");
        assert_eq!(record.artists, vec!["First", "Second"]);
        assert_eq!(record.artist_joined, "First, Second");
        assert_eq!(record.artist_ids, vec![ArtistId::new("a1"), ArtistId::new("a2")]);
        assert_eq!(record.album, "Album");
        assert_eq!(record.album_id, Some(AlbumId::new("al1")));
        assert_eq!(record.year, "2019");
        assert_eq!(record.genre, "k-pop, dance pop, hip hop");
        assert_eq!(record.artwork.image.as_deref(), Some("https://img/al1"));
        assert_eq!(record.artwork.album_image.as_deref(), Some("https://img/al1"));
        assert_eq!(record.artwork.artist_image.as_deref(), Some("https://img/a1"));
        assert_eq!(record.artwork.artist_images.len(), 2);
        assert_eq!(record.artwork.artist_images[&ArtistId::new("a2")], None);
        assert_eq!(record.lyrics.source, LyricsSource::Fallback);
    }

    #[tokio::test]
    async fn test_defaults_for_sparse_track() {
        let catalog = Arc::new(FakeCatalog::new());
        let tracks = enricher(&catalog, LyricsResolver::fallback_only());

        let mut track = catalog_track("Song", &[]);
        track.album = None;

        let record = tracks.enrich(&track, "t").await.unwrap();
        assert_eq!(record.album, "Unknown");
        assert_eq!(record.year, "Unknown");
        assert_eq!(record.artist_joined, "Unknown");
        assert_eq!(record.genre, UNKNOWN_GENRE);
        assert_eq!(
            record.artwork.artist_image.as_deref(),
            Some(PLACEHOLDER_ARTIST_IMAGE)
        );
        assert!(record.artwork.image.is_none());
    }

    #[tokio::test]
    async fn test_id_less_artist_keeps_lengths_aligned() {
        let catalog = Arc::new(FakeCatalog::new().with_artist("a1", None, &["folk"]));
        let tracks = enricher(&catalog, LyricsResolver::fallback_only());

        let mut track = catalog_track("Song", &[("a1", "Known")]);
        if let Some(artists) = track.artists.as_mut() {
            artists.push(ArtistRef {
                id: None,
                name: "Local".into(),
            });
        }

        let record = tracks.enrich(&track, "t").await.unwrap();
        assert_eq!(record.artists.len(), record.artist_ids.len());
        assert!(record.artist_ids[1].is_empty());
        assert_eq!(record.artwork.artist_images.len(), 1);
        assert_eq!(record.genre, "folk");
        record.validate().unwrap();
    }

    #[tokio::test]
    async fn test_second_enrich_is_served_from_cache() {
        let catalog = Arc::new(FakeCatalog::new().with_artist("a1", None, &["folk"]));
        let search = Arc::new(FakeLyrics::new().with_hits(vec![LyricsHit::new(
            "Song",
            "Artist",
            "https://genius.com/song",
        )]));
        let tracks = enricher(
            &catalog,
            LyricsResolver::new(Arc::clone(&search) as Arc<dyn LyricsSearch>),
        );
        let track = catalog_track("Song", &[("a1", "Artist")]);

        let first = tracks.enrich(&track, "t").await.unwrap();
        let second = tracks.enrich(&track, "t").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.lyrics.source, LyricsSource::Primary);
        assert_eq!(catalog.artist_calls(), 1);
        assert_eq!(search.calls(), 1);
        assert_eq!(tracks.cache_len().await, 1);
    }

    #[tokio::test]
    async fn test_nameless_track_is_rejected() {
        let catalog = Arc::new(FakeCatalog::new());
        let tracks = enricher(&catalog, LyricsResolver::fallback_only());

        let mut track = catalog_track("x", &[("a1", "Artist")]);
        track.name = None;

        let err = tracks.enrich(&track, "t").await.unwrap_err();
        assert!(matches!(err, EnrichError::InvalidTrack(_)));
        assert_eq!(catalog.artist_calls(), 0);
    }
}
