//! Spotify Web API client.
//!
//! Implements [`CatalogApi`] against the public Web API using an app-level
//! token from the client-credentials grant. The token is cached in-process
//! and refreshed shortly before it expires.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use playlens_core::model::{ArtistId, PlaylistId};

use crate::catalog::{CatalogApi, CatalogArtist, CatalogPlaylist, TrackPage};
use crate::error::{EnrichError, EnrichResult};
use crate::http::{build_client, read_json, transport_error};

const SOURCE: &str = "Spotify";

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Refresh the cached token this long before the catalog says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// When a token issued at `now` with `expires_in` seconds of life should be
/// replaced. A lifetime past the clock's range refreshes on the next call.
fn refresh_deadline(now: Instant, expires_in: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
    now.checked_add(lifetime).unwrap_or(now)
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Client for the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl SpotifyClient {
    /// Create a client from app credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> EnrichResult<Self> {
        Ok(Self {
            http: build_client(SOURCE)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        })
    }

    async fn request_token(&self) -> EnrichResult<TokenResponse> {
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;

        read_json(SOURCE, response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> EnrichResult<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, &e))?;

        read_json(SOURCE, response).await
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn access_token(&self) -> EnrichResult<String> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(EnrichError::Token {
                message: "client credentials are not configured".to_string(),
            });
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.request_token().await.map_err(|e| EnrichError::Token {
            message: e.to_string(),
        })?;

        log::debug!("Obtained catalog token valid for {}s", fresh.expires_in);

        *cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            refresh_at: refresh_deadline(Instant::now(), fresh.expires_in),
        });
        Ok(fresh.access_token)
    }

    async fn playlist(&self, id: &PlaylistId, token: &str) -> EnrichResult<CatalogPlaylist> {
        let url = format!("{API_BASE}/playlists/{}", urlencoding::encode(id.as_str()));
        self.get_json(&url, token, &[("fields", "name,images,description".to_string())])
            .await
    }

    async fn playlist_tracks(
        &self,
        id: &PlaylistId,
        token: &str,
        offset: usize,
        limit: usize,
    ) -> EnrichResult<TrackPage> {
        let url = format!(
            "{API_BASE}/playlists/{}/tracks",
            urlencoding::encode(id.as_str())
        );
        self.get_json(
            &url,
            token,
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn artist(&self, id: &ArtistId, token: &str) -> EnrichResult<CatalogArtist> {
        let url = format!("{API_BASE}/artists/{}", urlencoding::encode(id.as_str()));
        self.get_json(&url, token, &[]).await
    }
}
