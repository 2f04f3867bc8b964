//! Landing page

use axum::{extract::State, response::Html, routing::get, Router};

use crate::session::CurrentUser;
use crate::{views, AppResult, AppState};

/// GET /
pub async fn home_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> AppResult<Html<String>> {
    let html = match user {
        Some(user) => {
            let flash = user.take_flash(&state).await?;
            views::home::home_page(Some(&user.user), flash.as_ref())
        }
        None => views::home::home_page(None, None),
    };
    Ok(Html(html))
}

pub fn home_routes() -> Router<AppState> {
    Router::new().route("/", get(home_page))
}
