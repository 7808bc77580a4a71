pub mod api;
pub mod config;
pub mod error;
pub mod frontend;
pub mod models;
pub mod services;

use crate::services::{MusicCatalog, PromptInterpreter, SpotifyAuth, TrackAggregator};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, read-only request context. Nothing in here changes after startup.
pub struct AppState {
    pub catalog: Arc<dyn MusicCatalog>,
    pub aggregator: Arc<TrackAggregator>,
    /// `None` when no language model is configured
    pub interpreter: Option<Arc<PromptInterpreter>>,
    pub auth: Arc<SpotifyAuth>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn MusicCatalog>,
        interpreter: Option<Arc<PromptInterpreter>>,
        auth: Arc<SpotifyAuth>,
    ) -> Self {
        Self {
            aggregator: Arc::new(TrackAggregator::new(catalog.clone())),
            catalog,
            interpreter,
            auth,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::auth_routes())
        .nest("/api", api::playlist_routes())
        .with_state(state)
        // Frontend SPA - catch-all route (must be last)
        .fallback(get(frontend::serve_frontend))
        .layer(TraceLayer::new_for_http())
}
