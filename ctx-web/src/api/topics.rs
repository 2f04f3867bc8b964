//! Topic view, topic creation and the session's current scope

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use ctx_common::auth::Flash;
use ctx_common::models::{Attribute, DataType, Topic};
use ctx_common::RetrievalMode;
use tracing::{debug, info};

use crate::extract::{form_fields, FormBody, ResourcePath};
use crate::guard::owned_topic;
use crate::session::CurrentUser;
use crate::validation::{field, or_default, scope_or_universal, slugify, FormErrors, FORM_WARNING};
use crate::views::topics::{
    TopicForm, CREATION_TIMESTAMP_ATTRIBUTE, TOPIC_ALREADY_EXISTS, TOPIC_IDENTIFIER_EMPTY,
    TOPIC_INSTANCE_OF_MISSING, TOPIC_NAME_EMPTY,
};
use crate::{views, AppResult, AppState};

/// Instance-of used when the form leaves it blank
const DEFAULT_TOPIC_TYPE: &str = "topic";

pub fn topic_view_path(map_identifier: i64, topic_identifier: &str) -> String {
    format!("/topics/view/{}/{}", map_identifier, topic_identifier)
}

/// GET /topics/view/:map_identifier/:topic_identifier
pub async fn view(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let statistics = state
        .store
        .get_topic_occurrences_statistics(map_identifier, &topic_identifier)
        .await?;
    let associations = state
        .store
        .get_topic_associations(
            map_identifier,
            &topic_identifier,
            RetrievalMode::DontResolveAttributes,
        )
        .await?;
    let flash = user.take_flash(&state).await?;

    Ok(Html(views::topics::topic_page(
        &user.user,
        flash.as_ref(),
        &owned,
        &statistics,
        associations.len(),
        &user.session.current_scope,
    )))
}

/// GET /topics/create/:map_identifier/:topic_identifier
pub async fn create_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let form = TopicForm {
        instance_of: DEFAULT_TOPIC_TYPE.to_string(),
        ..TopicForm::default()
    };
    Ok(Html(views::topics::create_topic_page(
        &user.user,
        None,
        &owned,
        &form,
        FormErrors::new(),
    )))
}

/// POST /topics/create/:map_identifier/:topic_identifier
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let fields = form_fields(body)?;

    let form = TopicForm {
        identifier: slugify(&field(&fields, "topic-identifier")),
        name: field(&fields, "topic-name"),
        instance_of: or_default(field(&fields, "topic-instance-of"), DEFAULT_TOPIC_TYPE),
    };

    let store = &state.store;
    let mut errors = FormErrors::new();
    errors.flag_if(form.identifier.is_empty(), TOPIC_IDENTIFIER_EMPTY);
    errors.flag_if(form.name.is_empty(), TOPIC_NAME_EMPTY);
    errors.flag_if(
        !form.identifier.is_empty() && store.topic_exists(map_identifier, &form.identifier).await?,
        TOPIC_ALREADY_EXISTS,
    );
    errors.flag_if(
        !store.topic_exists(map_identifier, &form.instance_of).await?,
        TOPIC_INSTANCE_OF_MISSING,
    );

    if !errors.is_valid() {
        debug!("Create topic form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::topics::create_topic_page(
            &user.user,
            Some(&flash),
            &owned,
            &form,
            errors,
        ))
        .into_response());
    }

    let mut topic = Topic::new(form.identifier.as_str(), form.instance_of.as_str(), form.name.as_str());
    topic.attributes.push(Attribute::new(
        CREATION_TIMESTAMP_ATTRIBUTE,
        Utc::now().to_rfc3339(),
        form.identifier.as_str(),
        DataType::Timestamp,
    ));
    store.set_topic(map_identifier, &topic).await?;

    info!(
        "Created topic '{}' in topic map {}",
        topic.identifier, map_identifier
    );
    user.flash(&state, Flash::success("Topic successfully created."))
        .await?;
    Ok(Redirect::to(&topic_view_path(map_identifier, &topic.identifier)).into_response())
}

/// POST /topics/scope/:map_identifier/:topic_identifier
pub async fn change_scope(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
    body: FormBody,
) -> AppResult<Redirect> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let fields = form_fields(body)?;
    let scope = scope_or_universal(field(&fields, "scope"));

    if state.store.topic_exists(map_identifier, &scope).await? {
        state
            .users
            .set_current_scope(&user.session.token, &scope)
            .await?;
        user.flash(&state, Flash::success(format!("Scope changed to '{}'.", scope)))
            .await?;
    } else {
        user.flash(
            &state,
            Flash::warning(format!("Scope topic '{}' does not exist.", scope)),
        )
        .await?;
    }

    Ok(Redirect::to(&topic_view_path(
        map_identifier,
        &owned.topic.identifier,
    )))
}

pub fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topics/view/:map_identifier/:topic_identifier", get(view))
        .route(
            "/topics/create/:map_identifier/:topic_identifier",
            get(create_page).post(create),
        )
        .route(
            "/topics/scope/:map_identifier/:topic_identifier",
            post(change_scope),
        )
}
