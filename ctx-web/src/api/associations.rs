//! Association controller

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use ctx_common::auth::Flash;
use ctx_common::models::{Association, Member};
use ctx_common::RetrievalMode;
use tracing::{debug, info};

use crate::changes::{apply_association_updates, plan_association_update};
use crate::extract::{form_fields, FormBody, ResourcePath};
use crate::guard::{owned_topic, topic_association};
use crate::session::CurrentUser;
use crate::validation::{field, or_default, scope_or_universal, FormErrors, FORM_WARNING};
use crate::views::associations::{
    AssociationEditForm, AssociationForm, ADD_SCOPE_MISSING, DEST_ROLE_MISSING,
    DEST_TOPIC_EMPTY, DEST_TOPIC_MISSING, EDIT_SCOPE_MISSING, INSTANCE_OF_MISSING, NAME_EMPTY,
    SRC_ROLE_MISSING,
};
use crate::{views, AppResult, AppState};

const DEFAULT_INSTANCE_OF: &str = "association";
const DEFAULT_ROLE_SPEC: &str = "related";
const DEFAULT_NAME: &str = "Undefined";

fn associations_index_path(map_identifier: i64, topic_identifier: &str) -> String {
    format!("/associations/{}/{}", map_identifier, topic_identifier)
}

/// GET /associations/:map_identifier/:topic_identifier
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let associations = state
        .store
        .get_topic_associations(
            map_identifier,
            &topic_identifier,
            RetrievalMode::DontResolveAttributes,
        )
        .await?;
    let flash = user.take_flash(&state).await?;

    Ok(Html(views::associations::index_page(
        &user.user,
        flash.as_ref(),
        &owned,
        &associations,
    )))
}

/// GET /associations/add/:map_identifier/:topic_identifier
pub async fn add_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let form = AssociationForm {
        src_role_spec: DEFAULT_ROLE_SPEC.to_string(),
        dest_role_spec: DEFAULT_ROLE_SPEC.to_string(),
        instance_of: DEFAULT_INSTANCE_OF.to_string(),
        scope: user.session.current_scope.clone(),
        name: DEFAULT_NAME.to_string(),
        ..AssociationForm::default()
    };
    Ok(Html(views::associations::add_page(
        &user.user,
        None,
        &owned,
        &form,
        FormErrors::new(),
    )))
}

/// POST /associations/add/:map_identifier/:topic_identifier
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let fields = form_fields(body)?;

    let form = AssociationForm {
        dest_topic_ref: field(&fields, "association-dest-topic-ref"),
        src_role_spec: or_default(field(&fields, "association-src-role-spec"), DEFAULT_ROLE_SPEC),
        dest_role_spec: or_default(field(&fields, "association-dest-role-spec"), DEFAULT_ROLE_SPEC),
        instance_of: or_default(field(&fields, "association-instance-of"), DEFAULT_INSTANCE_OF),
        scope: scope_or_universal(field(&fields, "association-scope")),
        name: or_default(field(&fields, "association-name"), DEFAULT_NAME),
    };

    let store = &state.store;
    let mut errors = FormErrors::new();
    errors.flag_if(form.dest_topic_ref.is_empty(), DEST_TOPIC_EMPTY);
    errors.flag_if(
        !form.dest_topic_ref.is_empty()
            && !store.topic_exists(map_identifier, &form.dest_topic_ref).await?,
        DEST_TOPIC_MISSING,
    );
    errors.flag_if(
        !store.topic_exists(map_identifier, &form.scope).await?,
        ADD_SCOPE_MISSING,
    );
    errors.flag_if(
        !store.topic_exists(map_identifier, &form.instance_of).await?,
        INSTANCE_OF_MISSING,
    );
    errors.flag_if(
        !store.topic_exists(map_identifier, &form.src_role_spec).await?,
        SRC_ROLE_MISSING,
    );
    errors.flag_if(
        !store.topic_exists(map_identifier, &form.dest_role_spec).await?,
        DEST_ROLE_MISSING,
    );

    if !errors.is_valid() {
        debug!("Add association form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::associations::add_page(
            &user.user,
            Some(&flash),
            &owned,
            &form,
            errors,
        ))
        .into_response());
    }

    let association = Association::new(
        form.instance_of.as_str(),
        form.scope.as_str(),
        form.name.as_str(),
        Member::new(form.src_role_spec.as_str(), owned.topic.identifier.as_str()),
        Member::new(form.dest_role_spec.as_str(), form.dest_topic_ref.as_str()),
    );
    store.set_association(map_identifier, &association).await?;

    info!(
        "Created association {} between '{}' and '{}' in topic map {}",
        association.identifier, owned.topic.identifier, form.dest_topic_ref, map_identifier
    );
    user.flash(&state, Flash::success("Association successfully created."))
        .await?;
    Ok(Redirect::to(&associations_index_path(map_identifier, &owned.topic.identifier)).into_response())
}

/// GET /associations/edit/:map_identifier/:topic_identifier/:association_identifier
pub async fn edit_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, association_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let association = topic_association(&state, &owned, &association_identifier).await?;

    let form = AssociationEditForm {
        name: association.name.clone(),
        scope: association.scope.clone(),
    };
    Ok(Html(views::associations::edit_page(
        &user.user,
        None,
        &owned,
        &association,
        &form,
        FormErrors::new(),
    )))
}

/// POST /associations/edit/:map_identifier/:topic_identifier/:association_identifier
pub async fn edit(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, association_identifier)): ResourcePath<(i64, String, String)>,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let association = topic_association(&state, &owned, &association_identifier).await?;
    let fields = form_fields(body)?;

    let form = AssociationEditForm {
        name: field(&fields, "association-name"),
        scope: scope_or_universal(field(&fields, "association-scope")),
    };

    let mut errors = FormErrors::new();
    errors.flag_if(form.name.is_empty(), NAME_EMPTY);
    errors.flag_if(
        !state.store.topic_exists(map_identifier, &form.scope).await?,
        EDIT_SCOPE_MISSING,
    );

    if !errors.is_valid() {
        debug!("Edit association form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::associations::edit_page(
            &user.user,
            Some(&flash),
            &owned,
            &association,
            &form,
            errors,
        ))
        .into_response());
    }

    let updates = plan_association_update(&association, &form.name, &form.scope);
    apply_association_updates(&state.store, map_identifier, &association, &updates).await?;

    info!(
        "Updated association {} ({} change(s))",
        association.identifier,
        updates.len()
    );
    user.flash(&state, Flash::success("Association successfully updated."))
        .await?;
    Ok(Redirect::to(&associations_index_path(map_identifier, &owned.topic.identifier)).into_response())
}

/// GET /associations/delete/:map_identifier/:topic_identifier/:association_identifier
pub async fn delete_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, association_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let association = topic_association(&state, &owned, &association_identifier).await?;

    Ok(Html(views::associations::delete_page(
        &user.user,
        None,
        &owned,
        &association,
    )))
}

/// POST /associations/delete/:map_identifier/:topic_identifier/:association_identifier
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, association_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Redirect> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let association = topic_association(&state, &owned, &association_identifier).await?;

    state
        .store
        .delete_association(map_identifier, &association.identifier)
        .await?;

    info!(
        "Deleted association {} from topic map {}",
        association.identifier, map_identifier
    );
    user.flash(&state, Flash::warning("Association successfully deleted."))
        .await?;
    Ok(Redirect::to(&associations_index_path(map_identifier, &owned.topic.identifier)))
}

pub fn association_routes() -> Router<AppState> {
    Router::new()
        .route("/associations/:map_identifier/:topic_identifier", get(index))
        .route(
            "/associations/add/:map_identifier/:topic_identifier",
            get(add_page).post(add),
        )
        .route(
            "/associations/edit/:map_identifier/:topic_identifier/:association_identifier",
            get(edit_page).post(edit),
        )
        .route(
            "/associations/delete/:map_identifier/:topic_identifier/:association_identifier",
            get(delete_page).post(delete),
        )
}
