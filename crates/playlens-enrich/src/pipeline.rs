//! Playlist enrichment pipeline.
//!
//! Fetches playlist metadata and entries from the catalog, then enriches
//! tracks in fixed-size batches. Each track runs as its own task; a track
//! that fails is dropped (and optionally reported) without affecting its
//! batch-mates. Surviving records keep playlist order.

use std::sync::Arc;

use futures::future::join_all;

use playlens_core::model::{PlaylistId, PlaylistReport, PlaylistSummary, TrackFailure, TrackRecord};

use crate::catalog::{fetch_tracks, first_image, CatalogApi, CatalogTrack};
use crate::config::{Config, DEFAULT_TRACK_CONCURRENCY};
use crate::enrich::artist::ArtistEnricher;
use crate::enrich::lastfm::LastFmClient;
use crate::enrich::lyrics::{GeniusClient, LyricsResolver};
use crate::enrich::resilience::ArtistSlots;
use crate::enrich::track::TrackEnricher;
use crate::error::{EnrichError, EnrichResult};
use crate::spotify::SpotifyClient;

/// Track cap used when the caller gives none or an unparsable one.
pub const DEFAULT_TRACK_LIMIT: usize = 750;

/// Largest accepted track cap.
pub const MAX_TRACK_LIMIT: usize = 1000;

/// Parse and clamp a raw `limit` value to `1..=MAX_TRACK_LIMIT`.
///
/// Missing or non-numeric values give [`DEFAULT_TRACK_LIMIT`].
pub fn clamp_track_limit(raw: Option<&str>) -> usize {
    let Some(value) = raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
    else {
        return DEFAULT_TRACK_LIMIT;
    };
    value.clamp(1.0, MAX_TRACK_LIMIT as f64) as usize
}

/// Enriches whole playlists.
#[derive(Debug, Clone)]
pub struct PlaylistPipeline {
    catalog: Arc<dyn CatalogApi>,
    tracks: Arc<TrackEnricher>,
    batch_size: usize,
    report_failures: bool,
}

impl PlaylistPipeline {
    pub fn new(catalog: Arc<dyn CatalogApi>, tracks: TrackEnricher) -> Self {
        Self {
            catalog,
            tracks: Arc::new(tracks),
            batch_size: DEFAULT_TRACK_CONCURRENCY,
            report_failures: false,
        }
    }

    /// Build the production pipeline: Spotify as the catalog, plus Genius
    /// and Last.fm when their credentials are configured.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        let catalog: Arc<dyn CatalogApi> = Arc::new(SpotifyClient::new(
            config.spotify_client_id.clone().unwrap_or_default(),
            config.spotify_client_secret.clone().unwrap_or_default(),
        )?);

        let mut artists = ArtistEnricher::new(
            Arc::clone(&catalog),
            ArtistSlots::new(config.artist_concurrency),
        );
        if let Some(key) = &config.lastfm_api_key {
            artists = artists.with_tag_source(Arc::new(LastFmClient::new(key.as_str())?));
        }

        let lyrics = match &config.genius_access_token {
            Some(token) => LyricsResolver::new(Arc::new(GeniusClient::new(token.as_str())?)),
            None => LyricsResolver::fallback_only(),
        };

        log::info!(
            "Pipeline ready (lyrics search: {}, tag fallback: {}, batch size: {}, artist slots: {})",
            lyrics.has_search(),
            config.lastfm_api_key.is_some(),
            config.track_concurrency,
            config.artist_concurrency
        );

        Ok(Self::new(catalog, TrackEnricher::new(artists, lyrics))
            .with_batch_size(config.track_concurrency)
            .with_failure_reporting(config.report_failures))
    }

    /// Track pipelines started per batch (at least one).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Attach an `errors` list for dropped tracks to every report.
    #[must_use]
    pub fn with_failure_reporting(mut self, enabled: bool) -> Self {
        self.report_failures = enabled;
        self
    }

    /// Obtain a catalog token and enrich the playlist.
    pub async fn enrich_playlist(
        &self,
        playlist_id: &PlaylistId,
        max_tracks: usize,
    ) -> EnrichResult<PlaylistReport> {
        let token = self.catalog.access_token().await?;
        self.enrich_with_token(playlist_id, &token, max_tracks).await
    }

    /// Enrich up to `max_tracks` entries of a playlist using `token`.
    ///
    /// Fails when the playlist cannot be read (401/403 as
    /// [`EnrichError::Restricted`]) or holds no entries.
    pub async fn enrich_with_token(
        &self,
        playlist_id: &PlaylistId,
        token: &str,
        max_tracks: usize,
    ) -> EnrichResult<PlaylistReport> {
        let playlist = self
            .catalog
            .playlist(playlist_id, token)
            .await
            .map_err(restricted)?;

        let items = fetch_tracks(self.catalog.as_ref(), playlist_id, token, max_tracks)
            .await
            .map_err(restricted)?;
        if items.is_empty() {
            return Err(EnrichError::EmptyPlaylist);
        }

        let summary = PlaylistSummary::from_parts(
            playlist.name,
            first_image(playlist.images.as_deref()),
            playlist.description,
        );

        let entries: Vec<(usize, CatalogTrack)> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| item.track.map(|track| (index, track)))
            .collect();

        log::info!(
            "Enriching {} tracks of playlist {} in batches of {}",
            entries.len(),
            playlist_id,
            self.batch_size
        );

        let mut records: Vec<TrackRecord> = Vec::with_capacity(entries.len());
        let mut failures: Vec<TrackFailure> = Vec::new();

        for (batch_number, batch) in entries.chunks(self.batch_size).enumerate() {
            let handles = batch.iter().map(|(_, track)| {
                let tracks = Arc::clone(&self.tracks);
                let track = track.clone();
                let token = token.to_string();
                tokio::spawn(async move { tracks.enrich(&track, &token).await })
            });
            let outcomes = join_all(handles).await;

            for ((index, track), outcome) in batch.iter().zip(outcomes) {
                let error = match outcome {
                    Ok(Ok(record)) => {
                        records.push(record);
                        continue;
                    }
                    Ok(Err(e)) => e,
                    Err(join_error) => EnrichError::Task(join_error.to_string()),
                };

                log::warn!(
                    "Dropping track {} ({}): {}",
                    index,
                    track.name.as_deref().unwrap_or("<unnamed>"),
                    error
                );
                failures.push(TrackFailure {
                    index: *index,
                    track: track.name.clone(),
                    message: error.to_string(),
                });
            }

            log::debug!(
                "Batch {} settled: {} records, {} failures so far",
                batch_number + 1,
                records.len(),
                failures.len()
            );
        }

        log::info!(
            "Playlist {} enriched: {} tracks, {} dropped",
            playlist_id,
            records.len(),
            failures.len()
        );

        Ok(PlaylistReport {
            summary,
            tracks: records,
            errors: self.report_failures.then_some(failures),
        })
    }
}

/// Surface authorization failures on playlist reads as [`EnrichError::Restricted`].
fn restricted(err: EnrichError) -> EnrichError {
    match err.status() {
        Some(status @ (401 | 403)) => EnrichError::Restricted { status },
        _ => err,
    }
}
