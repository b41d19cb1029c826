//! Artist enrichment.
//!
//! Resolves an artist credit to an image and a genre label. Successful
//! lookups are cached by artist id for the life of the enricher; failed
//! lookups are not, so a rate-limited or flaky catalog never poisons
//! later requests.
//!
//! Catalog lookups run inside a shared [`ArtistSlots`] pool and follow the
//! fixed [`BACKOFF_SCHEDULE`]. When the catalog knows no genres for an
//! artist, the optional [`TagSource`] is consulted instead.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::sleep;

use playlens_core::model::{ArtistId, ArtistInfo, ArtistProfile, ArtistRef};

use crate::catalog::{first_image, CatalogApi, CatalogArtist};
use crate::enrich::lastfm::{genre_tags, TagSource};
use crate::enrich::resilience::{jittered, retry_wait, ArtistSlots, BACKOFF_SCHEDULE};

/// Maximum number of catalog genres kept per artist.
pub const MAX_CATALOG_GENRES: usize = 3;

/// Resolves artist credits, caching successful lookups.
#[derive(Debug)]
pub struct ArtistEnricher {
    catalog: Arc<dyn CatalogApi>,
    tags: Option<Arc<dyn TagSource>>,
    slots: ArtistSlots,
    cache: RwLock<HashMap<ArtistId, ArtistProfile>>,
}

impl ArtistEnricher {
    pub fn new(catalog: Arc<dyn CatalogApi>, slots: ArtistSlots) -> Self {
        Self {
            catalog,
            tags: None,
            slots,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Use `tags` as the genre fallback.
    #[must_use]
    pub fn with_tag_source(mut self, tags: Arc<dyn TagSource>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn slots(&self) -> &ArtistSlots {
        &self.slots
    }

    /// The cached profile for `id`, if one exists.
    pub async fn cached(&self, id: &ArtistId) -> Option<ArtistProfile> {
        self.cache.read().await.get(id).cloned()
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Resolve an artist credit. Never fails; unresolvable artists get
    /// [`ArtistInfo::unknown`].
    pub async fn resolve(&self, artist: &ArtistRef, token: &str) -> ArtistInfo {
        let Some(id) = artist.resolvable_id() else {
            return ArtistInfo::unknown();
        };

        if let Some(profile) = self.cached(id).await {
            return profile.to_info();
        }

        let Some(found) = self.lookup_catalog(id, &artist.name, token).await else {
            return ArtistInfo::unknown();
        };

        let image = first_image(found.images.as_deref());
        let mut genres = catalog_genres(&found);
        if genres.is_empty() {
            genres = self.fallback_genres(&artist.name).await;
        }

        let profile = ArtistProfile::new(image, genres);
        let info = profile.to_info();
        self.cache.write().await.insert(id.clone(), profile);
        info
    }

    /// Look the artist up in the catalog while holding a slot.
    ///
    /// Returns `None` on a non-retryable status, an exhausted schedule or
    /// a closed slot pool.
    async fn lookup_catalog(&self, id: &ArtistId, name: &str, token: &str) -> Option<CatalogArtist> {
        let Ok(_permit) = self.slots.acquire().await else {
            log::warn!("Artist slots closed; skipping lookup for {}", name);
            return None;
        };

        for base in BACKOFF_SCHEDULE {
            if !base.is_zero() {
                sleep(jittered(base)).await;
            }

            match self.catalog.artist(id, token).await {
                Ok(artist) => return Some(artist),
                Err(e) if e.is_transient() => {
                    let wait = retry_wait(&e);
                    log::warn!(
                        "[Retry] Artist lookup for {} failed ({}), waiting {}ms",
                        name,
                        e,
                        wait.as_millis()
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    log::warn!("[Skip] Artist lookup for {} failed: {}", name, e);
                    return None;
                }
            }
        }

        log::warn!(
            "[Skip] Artist lookup for {} gave up after {} attempts",
            name,
            BACKOFF_SCHEDULE.len()
        );
        None
    }

    async fn fallback_genres(&self, name: &str) -> Vec<String> {
        let Some(tags) = &self.tags else {
            return Vec::new();
        };
        if name.trim().is_empty() {
            return Vec::new();
        }

        match tags.artist_top_tags(name).await {
            Ok(raw) => genre_tags(&raw),
            Err(e) => {
                log::warn!("Tag lookup for {} failed: {}", name, e);
                Vec::new()
            }
        }
    }
}

/// Up to [`MAX_CATALOG_GENRES`] lowercase catalog genres, in catalog order.
fn catalog_genres(artist: &CatalogArtist) -> Vec<String> {
    artist
        .genres
        .iter()
        .flatten()
        .map(|genre| genre.trim().to_lowercase())
        .filter(|genre| !genre.is_empty())
        .take(MAX_CATALOG_GENRES)
        .collect()
}
