//! Lyrics link resolution.
//!
//! Searches the lyrics provider (when configured) and accepts a hit only
//! when it matches the track with high confidence. Everything else falls
//! back to a web-search URL restricted to known lyrics sites, so
//! resolution itself never fails.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use playlens_core::model::LyricsRef;
use playlens_core::text::{artists_match, jaccard, title_candidates, tokens};

use crate::error::EnrichResult;
use crate::http::{build_client, read_json, transport_error};

const SOURCE: &str = "Genius";

const GENIUS_SEARCH_URL: &str = "https://api.genius.com/search";

const FALLBACK_SEARCH_URL: &str = "https://www.google.com/search";

/// Site filters appended to the fallback search.
const LYRICS_SITES: &[&str] = &[
    "genius.com",
    "azlyrics.com",
    "musixmatch.com",
    "lyrics.com",
    "colorcodedlyrics.com",
    "fandom.com",
];

/// A hit must score strictly above this to be trusted.
pub const MATCH_THRESHOLD: f64 = 0.85;

const ARTIST_WEIGHT: f64 = 0.7;
const TITLE_WEIGHT: f64 = 0.3;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    response: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    result: Option<SongResult>,
}

#[derive(Debug, Deserialize)]
struct SongResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    primary_artist: Option<PrimaryArtist>,
}

#[derive(Debug, Deserialize)]
struct PrimaryArtist {
    #[serde(default)]
    name: Option<String>,
}

impl From<SongResult> for LyricsHit {
    fn from(song: SongResult) -> Self {
        Self {
            title: song.title.unwrap_or_default(),
            artist: song
                .primary_artist
                .and_then(|artist| artist.name)
                .unwrap_or_default(),
            url: song.url.filter(|url| !url.trim().is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One search result from the lyrics provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsHit {
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
}

impl LyricsHit {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            url: Some(url.into()),
        }
    }
}

/// Lyrics search provider.
#[async_trait]
pub trait LyricsSearch: Send + Sync + std::fmt::Debug {
    /// Ranked hits for a free-text query.
    async fn search(&self, query: &str) -> EnrichResult<Vec<LyricsHit>>;
}

/// Genius API client.
#[derive(Clone)]
pub struct GeniusClient {
    http: Client,
    access_token: String,
}

impl std::fmt::Debug for GeniusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeniusClient").finish_non_exhaustive()
    }
}

impl GeniusClient {
    pub fn new(access_token: impl Into<String>) -> EnrichResult<Self> {
        Ok(Self {
            http: build_client(SOURCE)?,
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl LyricsSearch for GeniusClient {
    async fn search(&self, query: &str) -> EnrichResult<Vec<LyricsHit>> {
        let response = self
            .http
            .get(GENIUS_SEARCH_URL)
            .bearer_auth(&self.access_token)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;

        let body: SearchResponse = read_json(SOURCE, response).await?;
        Ok(body
            .response
            .map(|r| r.hits)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|hit| hit.result)
            .map(LyricsHit::from)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// The best hit of a search and its confidence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredHit {
    pub score: f64,
    pub url: Option<String>,
}

impl ScoredHit {
    /// The hit's URL, if the score clears [`MATCH_THRESHOLD`].
    pub fn accepted_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|_| self.score > MATCH_THRESHOLD)
    }
}

/// Confidence that `hit` is the lyrics page for the requested track.
///
/// Weighted sum of an exact-or-containment artist match and the best title
/// token overlap across the title candidates.
pub fn score_hit(hit: &LyricsHit, title: &str, artist: &str) -> f64 {
    let hit_tokens = tokens(&hit.title);
    let title_score = title_candidates(title)
        .iter()
        .map(|candidate| jaccard(&tokens(candidate), &hit_tokens))
        .fold(0.0, f64::max);
    let artist_score = if artists_match(artist, &hit.artist) {
        1.0
    } else {
        0.0
    };

    ARTIST_WEIGHT * artist_score + TITLE_WEIGHT * title_score
}

/// Pick the highest-scoring hit. Ties keep the earlier hit.
pub fn best_hit(hits: &[LyricsHit], title: &str, artist: &str) -> ScoredHit {
    let mut best = ScoredHit::default();
    for hit in hits {
        let score = score_hit(hit, title, artist);
        if score > best.score {
            best = ScoredHit {
                score,
                url: hit.url.clone(),
            };
        }
    }
    best
}

/// Deterministic web-search URL for a track's lyrics.
pub fn fallback_url(title: &str, artist: &str, album: &str) -> String {
    let query = format!("{title} {artist} {album} lyrics");
    let sites = LYRICS_SITES
        .iter()
        .map(|site| format!("site:{site}"))
        .collect::<Vec<_>>()
        .join("+OR+");
    format!(
        "{FALLBACK_SEARCH_URL}?q={}+{sites}",
        urlencoding::encode(&query)
    )
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves a lyrics link for a track.
#[derive(Debug, Clone, Default)]
pub struct LyricsResolver {
    search: Option<Arc<dyn LyricsSearch>>,
}

impl LyricsResolver {
    /// A resolver that searches `search` before falling back.
    pub fn new(search: Arc<dyn LyricsSearch>) -> Self {
        Self {
            search: Some(search),
        }
    }

    /// A resolver that always produces the fallback URL.
    pub fn fallback_only() -> Self {
        Self { search: None }
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Resolve a link for `title` by `artist`. Never fails.
    pub async fn resolve(&self, title: &str, artist: &str, album: &str) -> LyricsRef {
        if let Some(search) = &self.search {
            match self.search_primary(search.as_ref(), title, artist).await {
                Ok(Some(url)) => return LyricsRef::primary(url),
                Ok(None) => {
                    log::debug!("No confident lyrics match for '{}' by {}", title, artist);
                }
                Err(e) => {
                    log::warn!("Lyrics search failed for '{}': {}", title, e);
                }
            }
        }

        LyricsRef::fallback(fallback_url(title, artist, album))
    }

    async fn search_primary(
        &self,
        search: &dyn LyricsSearch,
        title: &str,
        artist: &str,
    ) -> EnrichResult<Option<String>> {
        let first_candidate = title_candidates(title).into_iter().next().unwrap_or_default();
        let query = format!("{first_candidate} {artist}");

        let hits = search.search(query.trim()).await?;
        let best = best_hit(&hits, title, artist);
        Ok(best.accepted_url().map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLyrics;
    use playlens_core::model::LyricsSource;

    #[test]
    fn test_threshold_is_strict() {
        let at = ScoredHit {
            score: 0.85,
            url: Some("https://genius.com/a".into()),
        };
        assert_eq!(at.accepted_url(), None);

        let above = ScoredHit {
            score: 0.851,
            url: Some("https://genius.com/a".into()),
        };
        assert_eq!(above.accepted_url(), Some("https://genius.com/a"));
    }

    #[test]
    fn test_accepted_requires_url() {
        let hit = ScoredHit {
            score: 1.0,
            url: None,
        };
        assert_eq!(hit.accepted_url(), None);
    }

    #[test]
    fn test_score_exact_match() {
        let hit = LyricsHit::new("Dynamite", "BTS", "https://genius.com/bts-dynamite");
        let score = score_hit(&hit, "Dynamite", "BTS");
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_uses_best_title_candidate() {
        // "(feat. X)" is not a qualifier, so only the all-parens candidate
        // matches the hit title exactly.
        let hit = LyricsHit::new("Song", "Artist", "https://genius.com/song");
        let score = score_hit(&hit, "Song (feat. X)", "Artist");
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_wrong_artist_caps_at_title_weight() {
        let hit = LyricsHit::new("Dynamite", "Taio Cruz", "https://genius.com/x");
        let score = score_hit(&hit, "Dynamite", "BTS");
        assert!((score - TITLE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_best_hit_prefers_first_on_tie() {
        let hits = vec![
            LyricsHit::new("Song", "Artist", "https://genius.com/first"),
            LyricsHit::new("Song", "Artist", "https://genius.com/second"),
        ];
        let best = best_hit(&hits, "Song", "Artist");
        assert_eq!(best.url.as_deref(), Some("https://genius.com/first"));
    }

    #[test]
    fn test_best_hit_empty() {
        let best = best_hit(&[], "Song", "Artist");
        assert_eq!(best, ScoredHit::default());
        assert!(best.accepted_url().is_none());
    }

    #[test]
    fn test_fallback_url_shape() {
        let url = fallback_url("Song", "Artist", "Album");
        assert!(url.starts_with("https://www.google.com/search?q=Song%20Artist%20Album%20lyrics+site:genius.com"));
        assert!(url.ends_with("+OR+site:fandom.com"));
        for site in LYRICS_SITES {
            assert!(url.contains(&format!("site:{site}")));
        }
    }

    #[tokio::test]
    async fn test_resolver_without_search_falls_back() {
        let resolver = LyricsResolver::fallback_only();
        let lyrics = resolver.resolve("Song", "Artist", "Album").await;
        assert_eq!(lyrics.source, LyricsSource::Fallback);
        assert_eq!(lyrics.url, Some(fallback_url("Song", "Artist", "Album")));
    }

    #[tokio::test]
    async fn test_resolver_accepts_confident_hit() {
        let search = Arc::new(FakeLyrics::new().with_hits(vec![
            LyricsHit::new("Other Song", "Someone", "https://genius.com/other"),
            LyricsHit::new("Song", "Artist", "https://genius.com/artist-song"),
        ]));
        let resolver = LyricsResolver::new(Arc::<FakeLyrics>::clone(&search));

        let lyrics = resolver.resolve("Song (Live)", "Artist", "Album").await;
        assert_eq!(lyrics.source, LyricsSource::Primary);
        assert_eq!(lyrics.url.as_deref(), Some("https://genius.com/artist-song"));
        assert_eq!(search.queries(), vec!["Song Artist".to_string()]);
    }

    #[tokio::test]
    async fn test_resolver_rejects_weak_hit() {
        let search = Arc::new(FakeLyrics::new().with_hits(vec![LyricsHit::new(
            "Completely Different",
            "Artist",
            "https://genius.com/different",
        )]));
        let resolver = LyricsResolver::new(search);

        let lyrics = resolver.resolve("Song", "Artist", "Album").await;
        assert_eq!(lyrics.source, LyricsSource::Fallback);
    }

    #[tokio::test]
    async fn test_resolver_search_error_falls_back() {
        let search = Arc::new(FakeLyrics::new().failing());
        let resolver = LyricsResolver::new(search);

        let lyrics = resolver.resolve("Song", "Artist", "").await;
        assert_eq!(lyrics.source, LyricsSource::Fallback);
        assert!(lyrics.url.is_some());
    }
}
