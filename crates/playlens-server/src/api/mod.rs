//! HTTP API handlers

pub mod error;
pub mod health;
pub mod playlist;

pub use error::ApiError;
pub use health::health_routes;
pub use playlist::{get_playlist, playlist_routes};
