//! Topic map listing and creation

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use ctx_common::auth::Flash;
use tracing::debug;

use crate::session::CurrentUser;
use crate::validation::{field, FormErrors, FormFields, FORM_WARNING};
use crate::views::maps::MAP_NAME_EMPTY;
use crate::{views, AppResult, AppState};

/// GET /maps
pub async fn index(State(state): State<AppState>, user: CurrentUser) -> AppResult<Html<String>> {
    let maps = state.store.get_topic_maps(user.identifier()).await?;
    let flash = user.take_flash(&state).await?;

    Ok(Html(views::maps::maps_page(&user.user, flash.as_ref(), &maps)))
}

/// GET /maps/create
pub async fn create_page(user: CurrentUser) -> Html<String> {
    Html(views::maps::create_map_page(
        &user.user,
        None,
        "",
        "",
        FormErrors::new(),
    ))
}

/// POST /maps/create
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<FormFields>,
) -> AppResult<Response> {
    let name = field(&form, "map-name");
    let description = field(&form, "map-description");

    let mut errors = FormErrors::new();
    errors.flag_if(name.is_empty(), MAP_NAME_EMPTY);

    if !errors.is_valid() {
        debug!("Create map form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::maps::create_map_page(
            &user.user,
            Some(&flash),
            &name,
            &description,
            errors,
        ))
        .into_response());
    }

    state
        .store
        .create_topic_map(user.identifier(), &name, &description)
        .await?;

    user.flash(&state, Flash::success("Topic map successfully created."))
        .await?;
    Ok(Redirect::to("/maps").into_response())
}

pub fn map_routes() -> Router<AppState> {
    Router::new()
        .route("/maps", get(index))
        .route("/maps/create", get(create_page).post(create))
}
