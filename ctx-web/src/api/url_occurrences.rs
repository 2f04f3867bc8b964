//! Link and video controllers
//!
//! Both are URL occurrences that differ only in kind, path and form field
//! prefix, so one set of handlers serves both, parameterised by
//! [`UrlResource`].

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use ctx_common::auth::Flash;
use ctx_common::models::{Attribute, DataType, Occurrence};
use ctx_common::RetrievalMode;
use tracing::{debug, info};

use crate::changes::{apply_occurrence_updates, plan_occurrence_update, TITLE_ATTRIBUTE};
use crate::extract::{form_fields, FormBody, ResourcePath};
use crate::guard::{owned_topic, topic_occurrence};
use crate::session::CurrentUser;
use crate::validation::{field, is_web_url, scope_or_universal, FormErrors, FORM_WARNING};
use crate::views::occurrences::{
    UrlForm, ADD_SCOPE_MISSING, EDIT_SCOPE_MISSING, TITLE_EMPTY, URL_EMPTY, URL_NOT_WEB,
};
use crate::{views, AppResult, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlResource {
    Link,
    Video,
}

impl UrlResource {
    /// Occurrence instance-of
    pub fn instance_of(self) -> &'static str {
        match self {
            UrlResource::Link => "url",
            UrlResource::Video => "video",
        }
    }

    /// First URL path segment
    pub fn path(self) -> &'static str {
        match self {
            UrlResource::Link => "links",
            UrlResource::Video => "videos",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UrlResource::Link => "Link",
            UrlResource::Video => "Video",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            UrlResource::Link => "Links",
            UrlResource::Video => "Videos",
        }
    }

    /// Form field name, e.g. `link-title`
    pub fn field(self, name: &str) -> String {
        let prefix = match self {
            UrlResource::Link => "link",
            UrlResource::Video => "video",
        };
        format!("{}-{}", prefix, name)
    }

    fn index_path(self, map_identifier: i64, topic_identifier: &str) -> String {
        format!("/{}/{}/{}", self.path(), map_identifier, topic_identifier)
    }
}

type AppStateParam = State<AppState>;
type TopicPath = ResourcePath<(i64, String)>;
type OccurrencePath = ResourcePath<(i64, String, String)>;
type FormParam = FormBody;

async fn index(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): TopicPath,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let occurrences = state
        .store
        .get_topic_occurrences(
            map_identifier,
            &topic_identifier,
            resource.instance_of(),
            RetrievalMode::ResolveAttributes,
        )
        .await?;
    let flash = user.take_flash(&state).await?;

    Ok(Html(views::occurrences::index_page(
        &user.user,
        flash.as_ref(),
        resource,
        &owned,
        &occurrences,
    )))
}

async fn add_page(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): TopicPath,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let form = UrlForm {
        scope: user.session.current_scope.clone(),
        ..UrlForm::default()
    };
    Ok(Html(views::occurrences::add_page(
        &user.user,
        None,
        resource,
        &owned,
        &form,
        FormErrors::new(),
    )))
}

async fn add(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): TopicPath,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let fields = form_fields(body)?;

    let form = UrlForm {
        title: field(&fields, &resource.field("title")),
        url: field(&fields, &resource.field("url")),
        scope: scope_or_universal(field(&fields, &resource.field("scope"))),
    };

    let mut errors = FormErrors::new();
    errors.flag_if(form.title.is_empty(), TITLE_EMPTY);
    errors.flag_if(form.url.is_empty(), URL_EMPTY);
    errors.flag_if(!form.url.is_empty() && !is_web_url(&form.url), URL_NOT_WEB);
    errors.flag_if(
        !state.store.topic_exists(map_identifier, &form.scope).await?,
        ADD_SCOPE_MISSING,
    );

    if !errors.is_valid() {
        debug!(
            "Add {} form rejected (errors {})",
            resource.label().to_lowercase(),
            errors.bits()
        );
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::occurrences::add_page(
            &user.user,
            Some(&flash),
            resource,
            &owned,
            &form,
            errors,
        ))
        .into_response());
    }

    let occurrence = Occurrence::new(
        resource.instance_of(),
        owned.topic.identifier.as_str(),
        form.scope.as_str(),
        form.url.as_str(),
    );
    let title = Attribute::new(
        TITLE_ATTRIBUTE,
        form.title.as_str(),
        occurrence.identifier.as_str(),
        DataType::String,
    );

    state.store.set_occurrence(map_identifier, &occurrence).await?;
    state.store.set_attribute(map_identifier, &title).await?;

    info!(
        "Added {} occurrence {} to topic '{}' in topic map {}",
        resource.instance_of(),
        occurrence.identifier,
        owned.topic.identifier,
        map_identifier
    );
    user.flash(
        &state,
        Flash::success(format!("{} successfully added.", resource.label())),
    )
    .await?;
    Ok(Redirect::to(&resource.index_path(map_identifier, &owned.topic.identifier)).into_response())
}

async fn edit_page(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, occurrence_identifier)): OccurrencePath,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let occurrence =
        topic_occurrence(&state, &owned, resource.instance_of(), &occurrence_identifier).await?;

    Ok(Html(views::occurrences::edit_page(
        &user.user,
        None,
        resource,
        &owned,
        &occurrence.identifier,
        &UrlForm::from_occurrence(&occurrence),
        FormErrors::new(),
    )))
}

async fn edit(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, occurrence_identifier)): OccurrencePath,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let occurrence =
        topic_occurrence(&state, &owned, resource.instance_of(), &occurrence_identifier).await?;
    let fields = form_fields(body)?;

    let form = UrlForm {
        title: field(&fields, &resource.field("title")),
        url: occurrence.resource_ref.clone(),
        scope: scope_or_universal(field(&fields, &resource.field("scope"))),
    };

    let mut errors = FormErrors::new();
    errors.flag_if(form.title.is_empty(), TITLE_EMPTY);
    errors.flag_if(
        !state.store.topic_exists(map_identifier, &form.scope).await?,
        EDIT_SCOPE_MISSING,
    );

    if !errors.is_valid() {
        debug!(
            "Edit {} form rejected (errors {})",
            resource.label().to_lowercase(),
            errors.bits()
        );
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::occurrences::edit_page(
            &user.user,
            Some(&flash),
            resource,
            &owned,
            &occurrence.identifier,
            &form,
            errors,
        ))
        .into_response());
    }

    let updates = plan_occurrence_update(&occurrence, &form.title, &form.scope);
    apply_occurrence_updates(&state.store, map_identifier, &occurrence, &updates).await?;

    info!(
        "Updated {} occurrence {} ({} change(s))",
        resource.instance_of(),
        occurrence.identifier,
        updates.len()
    );
    user.flash(
        &state,
        Flash::success(format!("{} successfully updated.", resource.label())),
    )
    .await?;
    Ok(Redirect::to(&resource.index_path(map_identifier, &owned.topic.identifier)).into_response())
}

async fn delete_page(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, occurrence_identifier)): OccurrencePath,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let occurrence =
        topic_occurrence(&state, &owned, resource.instance_of(), &occurrence_identifier).await?;

    Ok(Html(views::occurrences::delete_page(
        &user.user,
        None,
        resource,
        &owned,
        &occurrence,
    )))
}

async fn delete(
    resource: UrlResource,
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, occurrence_identifier)): OccurrencePath,
) -> AppResult<Redirect> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let occurrence =
        topic_occurrence(&state, &owned, resource.instance_of(), &occurrence_identifier).await?;

    state
        .store
        .delete_occurrence(map_identifier, &occurrence.identifier)
        .await?;

    info!(
        "Deleted {} occurrence {} from topic map {}",
        resource.instance_of(),
        occurrence.identifier,
        map_identifier
    );
    user.flash(
        &state,
        Flash::warning(format!("{} successfully deleted.", resource.label())),
    )
    .await?;
    Ok(Redirect::to(&resource.index_path(map_identifier, &owned.topic.identifier)))
}

/// Routes for one URL resource kind
fn url_routes(resource: UrlResource) -> Router<AppState> {
    let topic_route = |action: Option<&str>| match action {
        Some(action) => format!(
            "/{}/{}/:map_identifier/:topic_identifier",
            resource.path(),
            action
        ),
        None => format!("/{}/:map_identifier/:topic_identifier", resource.path()),
    };
    let occurrence_route = |action: &str| {
        format!(
            "/{}/{}/:map_identifier/:topic_identifier/:occurrence_identifier",
            resource.path(),
            action
        )
    };

    Router::new()
        .route(
            &topic_route(None),
            get(move |state: AppStateParam, user: CurrentUser, path: TopicPath| {
                index(resource, state, user, path)
            }),
        )
        .route(
            &topic_route(Some("add")),
            get(move |state: AppStateParam, user: CurrentUser, path: TopicPath| {
                add_page(resource, state, user, path)
            })
            .post(
                move |state: AppStateParam, user: CurrentUser, path: TopicPath, form: FormParam| {
                    add(resource, state, user, path, form)
                },
            ),
        )
        .route(
            &occurrence_route("edit"),
            get(move |state: AppStateParam, user: CurrentUser, path: OccurrencePath| {
                edit_page(resource, state, user, path)
            })
            .post(
                move |state: AppStateParam, user: CurrentUser, path: OccurrencePath, form: FormParam| {
                    edit(resource, state, user, path, form)
                },
            ),
        )
        .route(
            &occurrence_route("delete"),
            get(move |state: AppStateParam, user: CurrentUser, path: OccurrencePath| {
                delete_page(resource, state, user, path)
            })
            .post(move |state: AppStateParam, user: CurrentUser, path: OccurrencePath| {
                delete(resource, state, user, path)
            }),
        )
}

pub fn link_routes() -> Router<AppState> {
    url_routes(UrlResource::Link)
}

pub fn video_routes() -> Router<AppState> {
    url_routes(UrlResource::Video)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_naming() {
        assert_eq!(UrlResource::Link.instance_of(), "url");
        assert_eq!(UrlResource::Video.instance_of(), "video");
        assert_eq!(UrlResource::Link.field("title"), "link-title");
        assert_eq!(UrlResource::Video.field("scope"), "video-scope");
        assert_eq!(UrlResource::Video.index_path(3, "rust"), "/videos/3/rust");
    }
}
