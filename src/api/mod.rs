use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod error;
mod polls;
pub mod rate_limit;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<tokio::sync::RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn poll_service(&self) -> &Arc<dyn crate::services::PollService> {
        &self.shared.poll_service
    }

    #[must_use]
    pub fn metadata(&self) -> &Arc<crate::services::MetadataService> {
        &self.shared.metadata
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &rate_limit::VoteRateLimiter {
        &self.shared.rate_limiter
    }
}

pub async fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared).await)
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    // Only the vote endpoint sits behind the rate limiter; reads never do.
    let vote_routes = Router::new()
        .route("/poll/vote/{poll_id}", post(polls::submit_votes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::vote_rate_limit,
        ));

    let api_router = Router::new()
        .route("/pool", get(polls::get_poll))
        .route("/pool", post(polls::create_poll))
        .route("/pool/results/{pool_id}", get(polls::get_results))
        .route("/poll/{poll_id}/votes", get(polls::get_user_votes))
        .route("/user", post(users::register_user))
        .merge(vote_routes)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
