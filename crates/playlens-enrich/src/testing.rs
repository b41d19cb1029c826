//! In-process provider fakes.
//!
//! Each fake counts its calls so tests can assert cache behaviour, and
//! [`FakeCatalog`] records how many artist lookups were in flight at once.
//! Available to this crate's tests and, with the `testing` feature, to
//! downstream crates.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use playlens_core::model::{AlbumId, ArtistId, ArtistRef, PlaylistId};

use crate::catalog::{
    CatalogAlbum, CatalogApi, CatalogArtist, CatalogImage, CatalogPlaylist, CatalogTrack,
    PlaylistItem, TrackPage,
};
use crate::enrich::lastfm::{LastFmTag, TagSource};
use crate::enrich::lyrics::{LyricsHit, LyricsSearch};
use crate::error::{EnrichError, EnrichResult};

/// Token handed out by [`FakeCatalog::access_token`].
const FAKE_TOKEN: &str = "fake-token";

fn status_error(source_name: &str, status: u16, retry_after: Option<Duration>) -> EnrichError {
    EnrichError::Status {
        source_name: source_name.to_string(),
        status,
        retry_after,
    }
}

/// A catalog entry for `title` credited to `(id, name)` pairs.
pub fn catalog_track(title: &str, artists: &[(&str, &str)]) -> CatalogTrack {
    CatalogTrack {
        name: Some(title.to_string()),
        album: Some(CatalogAlbum {
            id: Some(AlbumId::new(format!("album-{title}"))),
            name: Some(format!("{title} Album")),
            release_date: Some("2020-01-01".to_string()),
            images: Some(vec![CatalogImage {
                url: format!("https://img/album/{title}"),
            }]),
        }),
        artists: Some(
            artists
                .iter()
                .map(|(id, name)| ArtistRef::new(*id, *name))
                .collect(),
        ),
    }
}

/// A playlist entry wrapping [`catalog_track`].
pub fn track_item(title: &str, artists: &[(&str, &str)]) -> PlaylistItem {
    PlaylistItem {
        track: Some(catalog_track(title, artists)),
    }
}

/// A removed or unavailable playlist entry.
pub fn null_item() -> PlaylistItem {
    PlaylistItem { track: None }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Scriptable [`CatalogApi`].
///
/// Unknown artist ids resolve to an artist with no image and no genres.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    playlist: CatalogPlaylist,
    items: Vec<PlaylistItem>,
    artists: HashMap<ArtistId, CatalogArtist>,
    artist_failures: HashMap<ArtistId, u16>,
    artist_script: Mutex<VecDeque<(u16, Option<Duration>)>>,
    artist_delay: Duration,
    playlist_status: Option<u16>,
    page_failure: Option<(usize, u16)>,
    token_fails: bool,
    token_calls: AtomicUsize,
    page_calls: AtomicUsize,
    artist_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            playlist: CatalogPlaylist {
                name: Some("Fake Playlist".to_string()),
                images: Some(vec![CatalogImage {
                    url: "https://img/playlist".to_string(),
                }]),
                description: Some("A playlist for tests".to_string()),
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_playlist(mut self, playlist: CatalogPlaylist) -> Self {
        self.playlist = playlist;
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: Vec<PlaylistItem>) -> Self {
        self.items = items;
        self
    }

    #[must_use]
    pub fn with_artist(mut self, id: &str, image: Option<&str>, genres: &[&str]) -> Self {
        self.artists.insert(
            ArtistId::new(id),
            CatalogArtist {
                images: Some(
                    image
                        .map(|url| CatalogImage {
                            url: url.to_string(),
                        })
                        .into_iter()
                        .collect(),
                ),
                genres: Some(genres.iter().map(|g| (*g).to_string()).collect()),
            },
        );
        self
    }

    /// Every lookup of `id` fails with `status`.
    #[must_use]
    pub fn fail_artist(mut self, id: &str, status: u16) -> Self {
        self.artist_failures.insert(ArtistId::new(id), status);
        self
    }

    /// The next artist lookups (of any id) fail with these statuses, in
    /// order, before lookups start succeeding.
    #[must_use]
    pub fn script_artist_statuses(self, statuses: Vec<(u16, Option<Duration>)>) -> Self {
        *self
            .artist_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = statuses.into();
        self
    }

    /// Each artist lookup takes `delay` to answer.
    #[must_use]
    pub fn with_artist_delay(mut self, delay: Duration) -> Self {
        self.artist_delay = delay;
        self
    }

    /// The playlist metadata request fails with `status`.
    #[must_use]
    pub fn fail_playlist(mut self, status: u16) -> Self {
        self.playlist_status = Some(status);
        self
    }

    /// The track page starting at `offset` fails with `status`.
    #[must_use]
    pub fn fail_page_at(mut self, offset: usize, status: u16) -> Self {
        self.page_failure = Some((offset, status));
        self
    }

    #[must_use]
    pub fn fail_token(mut self) -> Self {
        self.token_fails = true;
        self
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn artist_calls(&self) -> usize {
        self.artist_calls.load(Ordering::SeqCst)
    }

    /// Highest number of artist lookups observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_scripted_failure(&self) -> Option<(u16, Option<Duration>)> {
        self.artist_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn access_token(&self) -> EnrichResult<String> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.token_fails {
            return Err(EnrichError::Token {
                message: "token endpoint unavailable".to_string(),
            });
        }
        Ok(FAKE_TOKEN.to_string())
    }

    async fn playlist(&self, _id: &PlaylistId, _token: &str) -> EnrichResult<CatalogPlaylist> {
        if let Some(status) = self.playlist_status {
            return Err(status_error("Spotify", status, None));
        }
        Ok(self.playlist.clone())
    }

    async fn playlist_tracks(
        &self,
        _id: &PlaylistId,
        _token: &str,
        offset: usize,
        limit: usize,
    ) -> EnrichResult<TrackPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((failing_offset, status)) = self.page_failure {
            if failing_offset == offset {
                return Err(status_error("Spotify", status, None));
            }
        }

        let end = (offset + limit).min(self.items.len());
        let items = self.items.get(offset..end).unwrap_or_default().to_vec();
        let next = (end < self.items.len()).then(|| format!("fake://tracks?offset={end}"));
        Ok(TrackPage { items, next })
    }

    async fn artist(&self, id: &ArtistId, _token: &str) -> EnrichResult<CatalogArtist> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.artist_delay.is_zero() {
            tokio::time::sleep(self.artist_delay).await;
        }

        let result = if let Some((status, retry_after)) = self.next_scripted_failure() {
            Err(status_error("Spotify", status, retry_after))
        } else if let Some(status) = self.artist_failures.get(id) {
            Err(status_error("Spotify", *status, None))
        } else {
            Ok(self.artists.get(id).cloned().unwrap_or_default())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// Tag source
// ---------------------------------------------------------------------------

/// Scriptable [`TagSource`] keyed by artist name.
#[derive(Debug, Default)]
pub struct FakeTags {
    tags: HashMap<String, Vec<LastFmTag>>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeTags {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tags(mut self, artist_name: &str, tags: Vec<LastFmTag>) -> Self {
        self.tags.insert(artist_name.to_string(), tags);
        self
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TagSource for FakeTags {
    async fn artist_top_tags(&self, artist_name: &str) -> EnrichResult<Vec<LastFmTag>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(status_error("Last.fm", 500, None));
        }
        Ok(self.tags.get(artist_name).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Lyrics search
// ---------------------------------------------------------------------------

/// Scriptable [`LyricsSearch`] returning the same hits for every query.
#[derive(Debug, Default)]
pub struct FakeLyrics {
    hits: Vec<LyricsHit>,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeLyrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hits(mut self, hits: Vec<LyricsHit>) -> Self {
        self.hits = hits;
        self
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.queries().len()
    }
}

#[async_trait]
impl LyricsSearch for FakeLyrics {
    async fn search(&self, query: &str) -> EnrichResult<Vec<LyricsHit>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());
        if self.failing {
            return Err(status_error("Genius", 503, None));
        }
        Ok(self.hits.clone())
    }
}
