//! Image controller
//!
//! Uploads arrive as multipart forms. The file is written to
//! `<resources_dir>/<map>/<topic>/<occurrence>.<ext>` and the occurrence's
//! resource reference holds the file name.

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use ctx_common::auth::Flash;
use ctx_common::models::{Attribute, DataType, Occurrence};
use ctx_common::RetrievalMode;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::changes::{apply_occurrence_updates, plan_occurrence_update, TITLE_ATTRIBUTE};
use crate::extract::{form_fields, multipart_body, FormBody, MultipartBody, ResourcePath};
use crate::guard::{owned_topic, topic_occurrence};
use crate::session::CurrentUser;
use crate::validation::{field, scope_or_universal, FormErrors, FORM_WARNING};
use crate::views::images::{
    ImageForm, ADD_SCOPE_MISSING, EDIT_SCOPE_MISSING, EXTENSION_NOT_ALLOWED, FILE_MISSING,
    TITLE_EMPTY,
};
use crate::{views, AppError, AppResult, AppState};

const IMAGE: &str = "image";

/// Accepted upload extensions (compared lower-case)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Lower-cased extension of an uploaded file name, if it is an allowed one
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let extension = std::path::Path::new(file_name)
        .extension()?
        .to_str()?
        .to_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

fn images_index_path(map_identifier: i64, topic_identifier: &str) -> String {
    format!("/images/{}/{}", map_identifier, topic_identifier)
}

fn topic_resources_dir(state: &AppState, map_identifier: i64, topic_identifier: &str) -> PathBuf {
    state
        .config
        .resources_dir
        .join(map_identifier.to_string())
        .join(topic_identifier)
}

/// Fields of the upload form
#[derive(Debug, Default)]
struct Upload {
    title: String,
    scope: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image-title" | "image-scope" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))?;
                if name == "image-title" {
                    upload.title = value.trim().to_string();
                } else {
                    upload.scope = value.trim().to_string();
                }
            }
            "image-file" => {
                upload.file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|file_name| !file_name.is_empty());
                upload.data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
                    .to_vec();
            }
            _ => {}
        }
    }

    Ok(upload)
}

/// GET /images/:map_identifier/:topic_identifier
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let images = state
        .store
        .get_topic_occurrences(
            map_identifier,
            &topic_identifier,
            IMAGE,
            RetrievalMode::ResolveAttributes,
        )
        .await?;
    let flash = user.take_flash(&state).await?;

    Ok(Html(views::images::index_page(
        &user.user,
        flash.as_ref(),
        &owned,
        &images,
    )))
}

/// GET /images/add/:map_identifier/:topic_identifier
pub async fn add_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let form = ImageForm {
        scope: user.session.current_scope.clone(),
        ..ImageForm::default()
    };
    Ok(Html(views::images::add_page(
        &user.user,
        None,
        &owned,
        &form,
        FormErrors::new(),
    )))
}

/// POST /images/add/:map_identifier/:topic_identifier
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier)): ResourcePath<(i64, String)>,
    body: MultipartBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;

    let upload = read_upload(multipart_body(body)?).await?;
    let form = ImageForm {
        title: upload.title,
        scope: scope_or_universal(upload.scope),
    };
    let has_file = upload.file_name.is_some() && !upload.data.is_empty();
    let extension = upload.file_name.as_deref().and_then(allowed_extension);

    let mut errors = FormErrors::new();
    errors.flag_if(form.title.is_empty(), TITLE_EMPTY);
    errors.flag_if(!has_file, FILE_MISSING);
    errors.flag_if(
        !state.store.topic_exists(map_identifier, &form.scope).await?,
        ADD_SCOPE_MISSING,
    );
    errors.flag_if(has_file && extension.is_none(), EXTENSION_NOT_ALLOWED);

    let extension = match extension {
        Some(extension) if errors.is_valid() => extension,
        _ => {
            debug!("Upload image form rejected (errors {})", errors.bits());
            let flash = Flash::warning(FORM_WARNING);
            return Ok(Html(views::images::add_page(
                &user.user,
                Some(&flash),
                &owned,
                &form,
                errors,
            ))
            .into_response());
        }
    };

    let mut occurrence = Occurrence::new(IMAGE, owned.topic.identifier.as_str(), form.scope.as_str(), "");
    occurrence.resource_ref = format!("{}.{}", occurrence.identifier, extension);

    let directory = topic_resources_dir(&state, map_identifier, &owned.topic.identifier);
    let file = directory.join(&occurrence.resource_ref);
    tokio::fs::create_dir_all(&directory).await?;
    tokio::fs::write(&file, &upload.data).await?;

    let title = Attribute::new(
        TITLE_ATTRIBUTE,
        form.title.as_str(),
        occurrence.identifier.as_str(),
        DataType::String,
    );
    let stored = async {
        state.store.set_occurrence(map_identifier, &occurrence).await?;
        state.store.set_attribute(map_identifier, &title).await
    }
    .await;
    if let Err(e) = stored {
        if let Err(delete_error) = state
            .store
            .delete_occurrence(map_identifier, &occurrence.identifier)
            .await
        {
            warn!("Failed to roll back image occurrence {}: {}", occurrence.identifier, delete_error);
        }
        if let Err(remove_error) = tokio::fs::remove_file(&file).await {
            warn!("Failed to remove {}: {}", file.display(), remove_error);
        }
        return Err(e.into());
    }

    info!(
        "Uploaded image {} ({} bytes) to topic '{}' in topic map {}",
        occurrence.resource_ref,
        upload.data.len(),
        owned.topic.identifier,
        map_identifier
    );
    user.flash(&state, Flash::success("Image successfully uploaded."))
        .await?;
    Ok(Redirect::to(&images_index_path(map_identifier, &owned.topic.identifier)).into_response())
}

/// GET /images/edit/:map_identifier/:topic_identifier/:image_identifier
pub async fn edit_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, image_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let image = topic_occurrence(&state, &owned, IMAGE, &image_identifier).await?;

    let form = ImageForm {
        title: views::occurrences::title_of(&image).to_string(),
        scope: image.scope.clone(),
    };
    Ok(Html(views::images::edit_page(
        &user.user,
        None,
        &owned,
        &image,
        &form,
        FormErrors::new(),
    )))
}

/// POST /images/edit/:map_identifier/:topic_identifier/:image_identifier
pub async fn edit(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, image_identifier)): ResourcePath<(i64, String, String)>,
    body: FormBody,
) -> AppResult<Response> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let image = topic_occurrence(&state, &owned, IMAGE, &image_identifier).await?;
    let fields = form_fields(body)?;

    let form = ImageForm {
        title: field(&fields, "image-title"),
        scope: scope_or_universal(field(&fields, "image-scope")),
    };

    let mut errors = FormErrors::new();
    errors.flag_if(form.title.is_empty(), TITLE_EMPTY);
    errors.flag_if(
        !state.store.topic_exists(map_identifier, &form.scope).await?,
        EDIT_SCOPE_MISSING,
    );

    if !errors.is_valid() {
        debug!("Edit image form rejected (errors {})", errors.bits());
        let flash = Flash::warning(FORM_WARNING);
        return Ok(Html(views::images::edit_page(
            &user.user,
            Some(&flash),
            &owned,
            &image,
            &form,
            errors,
        ))
        .into_response());
    }

    let updates = plan_occurrence_update(&image, &form.title, &form.scope);
    apply_occurrence_updates(&state.store, map_identifier, &image, &updates).await?;

    info!(
        "Updated image occurrence {} ({} change(s))",
        image.identifier,
        updates.len()
    );
    user.flash(&state, Flash::success("Image successfully updated."))
        .await?;
    Ok(Redirect::to(&images_index_path(map_identifier, &owned.topic.identifier)).into_response())
}

/// GET /images/delete/:map_identifier/:topic_identifier/:image_identifier
pub async fn delete_page(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, image_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Html<String>> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let image = topic_occurrence(&state, &owned, IMAGE, &image_identifier).await?;

    Ok(Html(views::images::delete_page(
        &user.user,
        None,
        &owned,
        &image,
    )))
}

/// POST /images/delete/:map_identifier/:topic_identifier/:image_identifier
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    ResourcePath((map_identifier, topic_identifier, image_identifier)): ResourcePath<(i64, String, String)>,
) -> AppResult<Redirect> {
    let owned = owned_topic(&state, &user, map_identifier, &topic_identifier).await?;
    let image = topic_occurrence(&state, &owned, IMAGE, &image_identifier).await?;

    state
        .store
        .delete_occurrence(map_identifier, &image.identifier)
        .await?;

    let file = topic_resources_dir(&state, map_identifier, &owned.topic.identifier)
        .join(&image.resource_ref);
    match tokio::fs::remove_file(&file).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Image file already missing: {}", file.display());
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        "Deleted image occurrence {} from topic map {}",
        image.identifier, map_identifier
    );
    user.flash(&state, Flash::warning("Image successfully deleted."))
        .await?;
    Ok(Redirect::to(&images_index_path(map_identifier, &owned.topic.identifier)))
}

pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/images/:map_identifier/:topic_identifier", get(index))
        .route(
            "/images/add/:map_identifier/:topic_identifier",
            get(add_page).post(add),
        )
        .route(
            "/images/edit/:map_identifier/:topic_identifier/:image_identifier",
            get(edit_page).post(edit),
        )
        .route(
            "/images/delete/:map_identifier/:topic_identifier/:image_identifier",
            get(delete_page).post(delete),
        )
}
