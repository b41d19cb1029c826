//! Primary catalog provider: trait seam, response types and the paginated
//! playlist track fetcher.

use async_trait::async_trait;
use serde::Deserialize;

use playlens_core::model::{AlbumId, ArtistId, ArtistRef, PlaylistId};

use crate::error::EnrichResult;

/// Fixed page size for playlist track listing.
pub const TRACK_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// An image entry; the catalog lists the largest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogImage {
    #[serde(default)]
    pub url: String,
}

/// First non-blank image URL of a list.
pub fn first_image(images: Option<&[CatalogImage]>) -> Option<String> {
    images?
        .first()
        .map(|image| image.url.trim())
        .filter(|url| !url.is_empty())
        .map(String::from)
}

/// Playlist-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogPlaylist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<CatalogImage>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One page of playlist entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// URL of the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// A playlist entry. `track` is null for removed or unavailable tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<CatalogTrack>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub album: Option<CatalogAlbum>,
    #[serde(default)]
    pub artists: Option<Vec<ArtistRef>>,
}

impl CatalogTrack {
    pub fn artists(&self) -> &[ArtistRef] {
        self.artists.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogAlbum {
    #[serde(default)]
    pub id: Option<AlbumId>,
    #[serde(default)]
    pub name: Option<String>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<CatalogImage>>,
}

/// Full artist object from the artist lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogArtist {
    #[serde(default)]
    pub images: Option<Vec<CatalogImage>>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Provider seam
// ---------------------------------------------------------------------------

/// The primary catalog API.
///
/// Non-success responses surface as [`EnrichError::Status`] so callers
/// can decide between retrying, degrading and aborting.
///
/// [`EnrichError::Status`]: crate::error::EnrichError::Status
#[async_trait]
pub trait CatalogApi: Send + Sync + std::fmt::Debug {
    /// Obtain a bearer token for the calls below.
    async fn access_token(&self) -> EnrichResult<String>;

    async fn playlist(&self, id: &PlaylistId, token: &str) -> EnrichResult<CatalogPlaylist>;

    async fn playlist_tracks(
        &self,
        id: &PlaylistId,
        token: &str,
        offset: usize,
        limit: usize,
    ) -> EnrichResult<TrackPage>;

    async fn artist(&self, id: &ArtistId, token: &str) -> EnrichResult<CatalogArtist>;
}

/// Fetch playlist entries page by page, up to `max_tracks`.
///
/// Stops when the catalog reports no further page or enough entries have
/// accumulated. Any failed page aborts the whole fetch; partial results
/// are never returned.
pub async fn fetch_tracks(
    catalog: &dyn CatalogApi,
    playlist_id: &PlaylistId,
    token: &str,
    max_tracks: usize,
) -> EnrichResult<Vec<PlaylistItem>> {
    let mut items: Vec<PlaylistItem> = Vec::new();
    let mut offset = 0;

    while items.len() < max_tracks {
        let page = catalog
            .playlist_tracks(playlist_id, token, offset, TRACK_PAGE_SIZE)
            .await?;

        log::debug!(
            "Fetched {} entries at offset {} for playlist {}",
            page.items.len(),
            offset,
            playlist_id
        );

        items.extend(page.items);

        if page.next.is_none() {
            break;
        }
        offset += TRACK_PAGE_SIZE;
    }

    items.truncate(max_tracks);
    Ok(items)
}
