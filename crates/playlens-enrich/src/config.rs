use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::enrich::resilience::MAX_ARTIST_PARALLEL;

/// Default number of track pipelines run per batch.
pub const DEFAULT_TRACK_CONCURRENCY: usize = 5;

/// Default HTTP listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Configuration for playlens.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (PLAYLENS_* prefix)
/// 3. Config file (~/.config/playlens/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spotify app client id.
    ///
    /// Can be set via:
    /// - ENV: PLAYLENS_SPOTIFY_CLIENT_ID
    /// - Config: spotify_client_id = "..."
    #[serde(default)]
    pub spotify_client_id: Option<String>,

    /// Spotify app client secret.
    ///
    /// Can be set via:
    /// - ENV: PLAYLENS_SPOTIFY_CLIENT_SECRET
    /// - Config: spotify_client_secret = "..."
    #[serde(default)]
    pub spotify_client_secret: Option<String>,

    /// Genius API access token. Enables lyrics search when set.
    #[serde(default)]
    pub genius_access_token: Option<String>,

    /// Last.fm API key. Enables the genre tag fallback when set.
    #[serde(default)]
    pub lastfm_api_key: Option<String>,

    /// Track pipelines run per batch.
    #[serde(
        default = "default_track_concurrency",
        deserialize_with = "crate::lenient::deserialize"
    )]
    pub track_concurrency: usize,

    /// Artist lookups allowed in flight across all tracks.
    #[serde(
        default = "default_artist_concurrency",
        deserialize_with = "crate::lenient::deserialize"
    )]
    pub artist_concurrency: usize,

    /// Include an `errors` array for dropped tracks in responses.
    #[serde(default, deserialize_with = "crate::lenient::deserialize")]
    pub report_failures: bool,

    /// HTTP listen address.
    ///
    /// Can be set via:
    /// - CLI: playlens serve --bind 0.0.0.0:8080
    /// - ENV: PLAYLENS_BIND_ADDRESS
    /// - Config: bind_address = "0.0.0.0:8080"
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            genius_access_token: None,
            lastfm_api_key: None,
            track_concurrency: default_track_concurrency(),
            artist_concurrency: default_artist_concurrency(),
            report_failures: false,
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/playlens/config.toml
    /// Reads environment variables with PLAYLENS_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `config_path` (if it exists) and the
    /// environment.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("playlens");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config.normalized())
    }

    /// Clamp concurrency settings to at least one and drop blank secrets.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.track_concurrency = self.track_concurrency.max(1);
        self.artist_concurrency = self.artist_concurrency.max(1);
        for secret in [
            &mut self.spotify_client_id,
            &mut self.spotify_client_secret,
            &mut self.genius_access_token,
            &mut self.lastfm_api_key,
        ] {
            if secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *secret = None;
            }
        }
        self
    }

    /// A copy safe to print: every secret is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "********".to_string());
        Self {
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: mask(&self.spotify_client_secret),
            genius_access_token: mask(&self.genius_access_token),
            lastfm_api_key: mask(&self.lastfm_api_key),
            ..self.clone()
        }
    }
}

fn default_track_concurrency() -> usize {
    DEFAULT_TRACK_CONCURRENCY
}

fn default_artist_concurrency() -> usize {
    MAX_ARTIST_PARALLEL
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/playlens/config.toml
/// - macOS: ~/Library/Application Support/playlens/config.toml
/// - Windows: %APPDATA%\playlens\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playlens")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Playlens Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (PLAYLENS_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Spotify app credentials (client-credentials flow)
# Required: playlists cannot be fetched without them.
#
# Create an app at: https://developer.spotify.com/dashboard
#
# Can also be set via:
# - Environment: PLAYLENS_SPOTIFY_CLIENT_ID / PLAYLENS_SPOTIFY_CLIENT_SECRET
#spotify_client_id = "your-client-id"
#spotify_client_secret = "your-client-secret"

# Genius API access token
# Optional: without it every lyrics link is a web-search URL.
#genius_access_token = "your-genius-token"

# Last.fm API key
# Optional: used for genres when Spotify lists none for an artist.
#lastfm_api_key = "your-lastfm-key"

# Track pipelines run per batch
#track_concurrency = 5

# Artist lookups allowed in flight at once, across all tracks
#artist_concurrency = 4

# Include an "errors" array listing dropped tracks in responses
#report_failures = false

# HTTP listen address
#
# Can also be set via:
# - CLI: playlens serve --bind 0.0.0.0:8080
#bind_address = "127.0.0.1:3000"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

/// Create the example config at `config_path` if nothing is there yet.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.track_concurrency, 5);
        assert_eq!(config.artist_concurrency, 4);
        assert!(!config.report_failures);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert!(config.spotify_client_id.is_none());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("missing.toml"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
spotify_client_id = "id"
spotify_client_secret = "secret"
track_concurrency = 8
artist_concurrency = "2"
report_failures = "true"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.spotify_client_id.as_deref(), Some("id"));
        assert_eq!(config.track_concurrency, 8);
        assert_eq!(config.artist_concurrency, 2);
        assert!(config.report_failures);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_normalized_clamps_and_drops_blank_secrets() {
        let config = Config {
            track_concurrency: 0,
            artist_concurrency: 0,
            genius_access_token: Some("  ".to_string()),
            lastfm_api_key: Some("key".to_string()),
            ..Config::default()
        }
        .normalized();

        assert_eq!(config.track_concurrency, 1);
        assert_eq!(config.artist_concurrency, 1);
        assert!(config.genius_access_token.is_none());
        assert_eq!(config.lastfm_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = Config {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("secret".to_string()),
            lastfm_api_key: Some("key".to_string()),
            ..Config::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.spotify_client_id.as_deref(), Some("id"));
        assert_eq!(shown.spotify_client_secret.as_deref(), Some("********"));
        assert_eq!(shown.lastfm_api_key.as_deref(), Some("********"));
        assert!(shown.genius_access_token.is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(ensure_config_file_at(&path).unwrap());
        assert!(!ensure_config_file_at(&path).unwrap());

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.track_concurrency, DEFAULT_TRACK_CONCURRENCY);
    }
}
