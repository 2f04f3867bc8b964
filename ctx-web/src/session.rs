//! Session cookie handling and the `CurrentUser` extractor
//!
//! The session token travels in the `ctx_session` cookie; everything else
//! (user, current scope, pending flash) lives in the sessions table.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use ctx_common::auth::{Flash, Session, User};

use crate::{AppError, AppResult, AppState};

/// Session cookie name
pub const SESSION_COOKIE: &str = "ctx_session";

/// The authenticated user behind a request
///
/// Extraction fails with [`AppError::Unauthenticated`] (a redirect to the
/// login page) when the cookie is missing, unknown, expired or belongs to an
/// inactive user. Use `Option<CurrentUser>` on public pages.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthenticated)?;

        let session = state
            .users
            .get_session(&token)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let user = state
            .users
            .get_user(session.user_identifier)
            .await?
            .filter(|user| user.active)
            .ok_or(AppError::Unauthenticated)?;

        Ok(Self { user, session })
    }
}

impl CurrentUser {
    pub fn identifier(&self) -> i64 {
        self.user.identifier
    }

    /// Queue a flash message for the next rendered page
    pub async fn flash(&self, state: &AppState, flash: Flash) -> AppResult<()> {
        state.users.set_flash(&self.session.token, &flash).await?;
        Ok(())
    }

    /// Pop the pending flash message, if any
    pub async fn take_flash(&self, state: &AppState) -> AppResult<Option<Flash>> {
        Ok(state.users.take_flash(&self.session.token).await?)
    }
}

/// Extract the session token from the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
        .next()
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
