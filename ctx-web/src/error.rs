//! Error types for ctx-web
//!
//! Every error renders as an HTML page. Validation failures are not errors:
//! handlers re-render the form instead.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing map, topic, occurrence or association (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Map owned by another user (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No live session; redirects to the login page
    #[error("Authentication required")]
    Unauthenticated,

    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Common error: {0}")]
    Common(#[from] ctx_common::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) | AppError::Common(ctx_common::Error::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated => {
                return Redirect::to(crate::api::auth::LOGIN_PATH).into_response();
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Io(_) | AppError::Common(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Html(views::errors::error_page(status))).into_response()
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;
