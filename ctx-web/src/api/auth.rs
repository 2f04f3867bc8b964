//! Login, registration and logout

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use ctx_common::auth::{Flash, MIN_PASSWORD_LENGTH};
use tracing::{debug, info};

use crate::session::{clear_session_cookie, session_cookie, session_token, CurrentUser};
use crate::validation::{field, FormErrors, FormFields, FORM_WARNING};
use crate::views::auth::{
    CHANGE_CURRENT_PASSWORD_WRONG, CHANGE_PASSWORDS_DIFFER, CHANGE_PASSWORD_TOO_SHORT,
    REGISTER_EMAIL_EMPTY, REGISTER_EMAIL_EXISTS, REGISTER_PASSWORDS_DIFFER,
    REGISTER_PASSWORD_TOO_SHORT,
};
use crate::{views, AppError, AppResult, AppState};

/// Where unauthenticated requests are sent
pub const LOGIN_PATH: &str = "/auth/login";

/// Role given to self-registered users
const DEFAULT_USER_ROLE: &str = "user";

/// Start a session for `user_identifier` and redirect to the post-login view
async fn start_session(state: &AppState, user_identifier: i64) -> AppResult<Response> {
    let lifetime = state.config.security.session_lifetime_seconds;
    let session = state.users.create_session(user_identifier, lifetime).await?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&session.token, lifetime))],
        Redirect::to(&state.config.security.post_login_view),
    )
        .into_response())
}

/// GET /auth/login
pub async fn login_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Response {
    if user.is_some() {
        return Redirect::to(&state.config.security.post_login_view).into_response();
    }
    Html(views::auth::login_page(
        "",
        false,
        None,
        state.config.security.registerable,
    ))
    .into_response()
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<FormFields>,
) -> AppResult<Response> {
    let email = field(&form, "email");
    let password = form.get("password").cloned().unwrap_or_default();

    match state.users.authenticate(&email, &password).await? {
        Some(user) => {
            info!("User {} logged in", user.identifier);
            start_session(&state, user.identifier).await
        }
        None => {
            debug!("Failed login attempt");
            Ok(Html(views::auth::login_page(
                &email,
                true,
                None,
                state.config.security.registerable,
            ))
            .into_response())
        }
    }
}

fn require_registerable(state: &AppState) -> AppResult<()> {
    if state.config.security.registerable {
        Ok(())
    } else {
        Err(AppError::NotFound("registration is disabled".to_string()))
    }
}

/// GET /auth/register
pub async fn register_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    require_registerable(&state)?;
    Ok(Html(views::auth::register_page("", FormErrors::new(), None)))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<FormFields>,
) -> AppResult<Response> {
    require_registerable(&state)?;

    let email = field(&form, "email");
    let password = form.get("password").cloned().unwrap_or_default();
    let password_confirm = form.get("password-confirm").cloned().unwrap_or_default();

    let mut errors = FormErrors::new();
    errors.flag_if(email.is_empty(), REGISTER_EMAIL_EMPTY);
    errors.flag_if(
        password.chars().count() < MIN_PASSWORD_LENGTH,
        REGISTER_PASSWORD_TOO_SHORT,
    );
    errors.flag_if(password != password_confirm, REGISTER_PASSWORDS_DIFFER);
    errors.flag_if(
        !email.is_empty() && state.users.email_exists(&email).await?,
        REGISTER_EMAIL_EXISTS,
    );

    if errors.is_valid() {
        match state
            .users
            .create_user(&email, &password, &[DEFAULT_USER_ROLE])
            .await
        {
            Ok(user) => return start_session(&state, user.identifier).await,
            // unique email constraint; registered concurrently since the check above
            Err(ctx_common::Error::InvalidInput(_)) => errors.flag(REGISTER_EMAIL_EXISTS),
            Err(e) => return Err(e.into()),
        }
    }

    debug!("Registration form rejected (errors {})", errors.bits());
    let flash = Flash::warning(FORM_WARNING);
    Ok(Html(views::auth::register_page(&email, errors, Some(&flash))).into_response())
}

/// GET /auth/change-password
pub async fn change_password_page(user: CurrentUser) -> Html<String> {
    Html(views::auth::change_password_page(
        &user.user,
        FormErrors::new(),
        None,
    ))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<FormFields>,
) -> AppResult<Response> {
    let current = form.get("current-password").cloned().unwrap_or_default();
    let password = form.get("new-password").cloned().unwrap_or_default();
    let password_confirm = form.get("new-password-confirm").cloned().unwrap_or_default();

    let current_valid = state
        .users
        .authenticate(&user.user.email, &current)
        .await?
        .is_some_and(|authenticated| authenticated.identifier == user.identifier());

    let mut errors = FormErrors::new();
    errors.flag_if(!current_valid, CHANGE_CURRENT_PASSWORD_WRONG);
    errors.flag_if(
        password.chars().count() < MIN_PASSWORD_LENGTH,
        CHANGE_PASSWORD_TOO_SHORT,
    );
    errors.flag_if(password != password_confirm, CHANGE_PASSWORDS_DIFFER);

    if !errors.is_valid() {
        debug!("Change password form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::auth::change_password_page(&user.user, errors, Some(&flash)))
            .into_response());
    }

    state
        .users
        .update_password(user.identifier(), &password)
        .await?;

    user.flash(&state, Flash::success("Password successfully changed."))
        .await?;
    Ok(Redirect::to(&state.config.security.post_login_view).into_response())
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session_token(&headers) {
        state.users.delete_session(&token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/register", get(register_page).post(register))
        .route(
            "/auth/change-password",
            get(change_password_page).post(change_password),
        )
        .route("/auth/logout", post(logout))
}
