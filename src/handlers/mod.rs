/// HTTP handlers for the guidance API
pub mod guidance;
pub mod history;
pub mod profile;

#[cfg(test)]
mod test_handlers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::GuidanceService;
use crate::auth;
use crate::config::Config;
use crate::repository_traits::{HistoryRepository, ProfileRepository, SessionVerifier};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GuidanceService>,
    pub repository: Arc<dyn HistoryRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        service: Arc<GuidanceService>,
        repository: Arc<dyn HistoryRepository>,
        profiles: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionVerifier>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            service,
            repository,
            profiles,
            sessions,
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let signed_in = Router::new()
        .route("/api/guidance", post(guidance::seek_guidance))
        .route("/api/guidance/:id", get(guidance::get_guidance))
        .route("/api/history", get(history::list_history))
        .route("/api/history/:id/favorite", put(history::set_favorite))
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .merge(signed_in)
        .route("/api/render", post(guidance::render_guidance))
        .route("/api/faith-levels", get(profile::list_faith_levels))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}
