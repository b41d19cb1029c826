//! Playlist enrichment for playlens.
//!
//! Fetches a playlist from the catalog and turns each entry into a
//! [`TrackRecord`](playlens_core::model::TrackRecord) with artist artwork,
//! canonical genres and a lyrics link. Providers sit behind traits
//! ([`CatalogApi`], [`TagSource`], [`LyricsSearch`]) so the pipeline can
//! run against in-process fakes.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
mod http;
mod lenient;
pub mod pipeline;
pub mod spotify;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use catalog::CatalogApi;
pub use config::Config;
pub use enrich::artist::ArtistEnricher;
pub use enrich::lastfm::{LastFmClient, TagSource};
pub use enrich::lyrics::{GeniusClient, LyricsResolver, LyricsSearch};
pub use enrich::resilience::ArtistSlots;
pub use enrich::track::TrackEnricher;
pub use error::{EnrichError, EnrichResult};
pub use pipeline::{clamp_track_limit, PlaylistPipeline};
pub use spotify::SpotifyClient;
