//! Last.fm tag source.
//!
//! Fetches folksonomy tags for an artist from the Last.fm API. Tags are
//! community-driven labels with usage counts; they are noisy, so
//! [`genre_tags`] keeps only well-used, genre-like tags and folds them into
//! canonical spellings. Used only when the catalog knows no genres for an
//! artist.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use playlens_core::taxonomy::{canonicalize_genre, is_denylisted};

use crate::enrich::resilience::RateLimiter;
use crate::error::EnrichResult;
use crate::http::{build_client, read_json, transport_error};

const SOURCE: &str = "Last.fm";

const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// A tag must be applied by strictly more users than this to count.
pub const MIN_TAG_COUNT: u32 = 30;

/// Maximum number of genres taken from the tag list.
pub const MAX_TAG_GENRES: usize = 3;

// ---------------------------------------------------------------------------
// API response types (private -- Last.fm nests JSON awkwardly)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    #[serde(default)]
    toptags: Option<TopTags>,
}

#[derive(Debug, Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: Vec<LastFmTag>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single folksonomy tag returned by the Last.fm API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastFmTag {
    /// Human-readable tag name (e.g. "indie rock", "seen live").
    #[serde(default)]
    pub name: String,
    /// Number of users who applied this tag. Sent as a number or a string.
    #[serde(default, deserialize_with = "crate::lenient::deserialize")]
    pub count: u32,
}

impl LastFmTag {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Secondary genre source queried by artist name.
#[async_trait]
pub trait TagSource: Send + Sync + std::fmt::Debug {
    /// Raw, unfiltered top tags for an artist.
    async fn artist_top_tags(&self, artist_name: &str) -> EnrichResult<Vec<LastFmTag>>;
}

/// Filter raw tags down to canonical genre labels.
///
/// Keeps tags used more than [`MIN_TAG_COUNT`] times, lowercases and trims
/// them, drops denylisted and blank tags, takes the first
/// [`MAX_TAG_GENRES`] and canonicalizes each.
pub fn genre_tags(tags: &[LastFmTag]) -> Vec<String> {
    tags.iter()
        .filter(|tag| tag.count > MIN_TAG_COUNT)
        .map(|tag| tag.name.trim().to_lowercase())
        .filter(|name| !name.is_empty() && !is_denylisted(name))
        .take(MAX_TAG_GENRES)
        .map(|name| canonicalize_genre(&name))
        .collect()
}

/// Last.fm API client.
///
/// Wraps an HTTP client, an API key, and a rate limiter. The Last.fm API
/// allows up to 5 requests per second for non-commercial use.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: Client,
    api_key: String,
    rate_limiter: RateLimiter,
}

impl LastFmClient {
    /// Create a new Last.fm API client.
    ///
    /// The `api_key` must be a valid Last.fm API key obtained from
    /// <https://www.last.fm/api/account/create>.
    pub fn new(api_key: impl Into<String>) -> EnrichResult<Self> {
        Ok(Self {
            http: build_client(SOURCE)?,
            api_key: api_key.into(),
            rate_limiter: RateLimiter::new(5),
        })
    }
}

#[async_trait]
impl TagSource for LastFmClient {
    async fn artist_top_tags(&self, artist_name: &str) -> EnrichResult<Vec<LastFmTag>> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(LASTFM_API_BASE)
            .query(&[
                ("method", "artist.getTopTags"),
                ("artist", artist_name),
                ("api_key", &self.api_key),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;

        let result: TopTagsResponse = read_json(SOURCE, response).await?;
        Ok(result.toptags.map(|t| t.tag).unwrap_or_default())
    }
}
