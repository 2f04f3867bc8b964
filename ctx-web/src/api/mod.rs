//! HTTP handlers for ctx-web
//!
//! One module per resource. Each exposes a `*_routes()` builder merged by
//! [`crate::build_router`].

pub mod associations;
pub mod auth;
pub mod health;
pub mod home;
pub mod images;
pub mod maps;
pub mod topics;
pub mod url_occurrences;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

pub use associations::association_routes;
pub use auth::auth_routes;
pub use health::health_routes;
pub use home::home_routes;
pub use images::image_routes;
pub use maps::map_routes;
pub use topics::topic_routes;
pub use url_occurrences::{link_routes, video_routes};

use crate::views;

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(views::errors::error_page(StatusCode::NOT_FOUND)),
    )
}
