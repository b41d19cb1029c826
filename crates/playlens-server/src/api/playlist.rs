//! Playlist enrichment endpoint

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use playlens_core::model::{PlaylistId, PlaylistReport};
use playlens_enrich::clamp_track_limit;

use crate::api::ApiError;
use crate::AppState;

/// Query parameters for playlist enrichment
#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    /// Track cap; kept raw so malformed values fall back to the default.
    pub limit: Option<String>,
}

/// GET /api/playlist/:id
///
/// Enriches up to `limit` tracks (clamped to 1..=1000, default 750).
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<PlaylistReport>, ApiError> {
    let max_tracks = clamp_track_limit(query.limit.as_deref());
    let playlist_id = PlaylistId::new(id);
    info!("Playlist request for {} (limit {})", playlist_id, max_tracks);

    let report = state
        .pipeline
        .enrich_playlist(&playlist_id, max_tracks)
        .await?;

    Ok(Json(report))
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new().route("/api/playlist/:id", get(get_playlist))
}
