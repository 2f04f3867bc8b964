//! ctx-web library - Contextualise web application
//!
//! Server-rendered topic map editor. Every resource controller follows the
//! same path: session extractor → ownership guard → form validation (on
//! write) → topic store → HTML view.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use ctx_common::config::Config;
use ctx_common::{TopicStore, UserStore};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod changes;
pub mod error;
pub mod extract;
pub mod guard;
pub mod session;
pub mod validation;
pub mod views;

pub use crate::error::{AppError, AppResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration resolved once at startup
    pub config: Arc<Config>,
    /// Topic map persistence
    pub store: TopicStore,
    /// Users, roles and sessions
    pub users: UserStore,
    /// Server start, reported by `/health`
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, store: TopicStore, users: UserStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
            users,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let resources = ServeDir::new(&state.config.resources_dir);
    let body_limit = state.config.server.max_content_length;

    Router::new()
        .merge(api::home_routes())
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::map_routes())
        .merge(api::topic_routes())
        .merge(api::link_routes())
        .merge(api::video_routes())
        .merge(api::image_routes())
        .merge(api::association_routes())
        .nest_service("/resources", resources)
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
