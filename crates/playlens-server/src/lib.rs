//! HTTP boundary for playlens.
//!
//! Exposes the playlist enrichment pipeline as a small JSON API:
//! `GET /api/playlist/:id` and `GET /health`.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

use std::sync::Arc;

use axum::Router;
use playlens_enrich::PlaylistPipeline;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<PlaylistPipeline>,
}

impl AppState {
    pub fn new(pipeline: PlaylistPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::playlist_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
