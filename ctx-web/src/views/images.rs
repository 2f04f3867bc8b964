use ctx_common::auth::{Flash, User};
use ctx_common::models::Occurrence;

use super::occurrences::title_of;
use super::topics::topic_header;
use super::{escape, feedback, invalid_class, page, text_input};
use crate::guard::OwnedTopic;
use crate::validation::FormErrors;

pub const TITLE_EMPTY: u32 = 1;
pub const FILE_MISSING: u32 = 2;
pub const ADD_SCOPE_MISSING: u32 = 4;
pub const EXTENSION_NOT_ALLOWED: u32 = 8;
pub const EDIT_SCOPE_MISSING: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct ImageForm {
    pub title: String,
    pub scope: String,
}

/// Public URL of a stored image
pub fn image_src(owned: &OwnedTopic, occurrence: &Occurrence) -> String {
    format!(
        "/resources/{}/{}/{}",
        owned.map_identifier(),
        escape(&owned.topic.identifier),
        escape(&occurrence.resource_ref)
    )
}

fn images_path(owned: &OwnedTopic, action: Option<&str>) -> String {
    match action {
        Some(action) => format!(
            "/images/{}/{}/{}",
            action,
            owned.map_identifier(),
            escape(&owned.topic.identifier)
        ),
        None => format!(
            "/images/{}/{}",
            owned.map_identifier(),
            escape(&owned.topic.identifier)
        ),
    }
}

pub fn index_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    images: &[Occurrence],
) -> String {
    let listing = if images.is_empty() {
        r#"<p class="muted">This topic has no images.</p>"#.to_string()
    } else {
        let rows: String = images
            .iter()
            .map(|image| {
                format!(
                    r#"<tr>
                    <td><img src="{src}" alt="{title}" width="160"></td>
                    <td>{title}</td>
                    <td>{scope}</td>
                    <td><a href="{edit}/{id}">Edit</a> <a href="{delete}/{id}">Delete</a></td>
                </tr>"#,
                    src = image_src(owned, image),
                    title = escape(title_of(image)),
                    scope = escape(&image.scope),
                    edit = images_path(owned, Some("edit")),
                    delete = images_path(owned, Some("delete")),
                    id = escape(&image.identifier)
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th></th><th>Title</th><th>Scope</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let body = format!(
        r#"{header}
        {listing}
        <p class="actions"><a href="{add}">Upload image</a></p>"#,
        header = topic_header(owned, "Images"),
        listing = listing,
        add = images_path(owned, Some("add"))
    );

    page("Images", Some(user), flash, &body)
}

pub fn add_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    form: &ImageForm,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"{header}
        <form method="post" action="{action}" enctype="multipart/form-data">
            {title}
            <label for="image-file">File</label>
            <input type="file" id="image-file" name="image-file" class="form-control{file_class}" accept=".png,.jpg,.jpeg,.gif,.webp">
            {file_missing}{bad_extension}
            {scope}
            <div class="actions"><button type="submit">Upload</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Upload image"),
        action = images_path(owned, Some("add")),
        title = text_input(
            "image-title",
            "Title",
            &form.title,
            errors,
            &[(TITLE_EMPTY, "Title is required.")]
        ),
        file_class = invalid_class(errors, FILE_MISSING | EXTENSION_NOT_ALLOWED),
        file_missing = feedback(errors, FILE_MISSING, "Select an image to upload."),
        bad_extension = feedback(
            errors,
            EXTENSION_NOT_ALLOWED,
            "Only png, jpg, jpeg, gif and webp images are allowed."
        ),
        scope = text_input(
            "image-scope",
            "Scope",
            &form.scope,
            errors,
            &[(ADD_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        cancel = images_path(owned, None)
    );

    page("Upload image", Some(user), flash, &body)
}

pub fn edit_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    image: &Occurrence,
    form: &ImageForm,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"{header}
        <p><img src="{src}" alt="{alt}" width="320"></p>
        <form method="post" action="{action}/{id}">
            {title}
            {scope}
            <div class="actions"><button type="submit">Update</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Edit image"),
        src = image_src(owned, image),
        alt = escape(&form.title),
        action = images_path(owned, Some("edit")),
        id = escape(&image.identifier),
        title = text_input(
            "image-title",
            "Title",
            &form.title,
            errors,
            &[(TITLE_EMPTY, "Title is required.")]
        ),
        scope = text_input(
            "image-scope",
            "Scope",
            &form.scope,
            errors,
            &[(EDIT_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        cancel = images_path(owned, None)
    );

    page("Edit image", Some(user), flash, &body)
}

pub fn delete_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    image: &Occurrence,
) -> String {
    let body = format!(
        r#"{header}
        <p>Are you sure you want to delete this image?</p>
        <p><img src="{src}" alt="{title}" width="320"></p>
        <p>{title} <span class="muted">({scope})</span></p>
        <form method="post" action="{action}/{id}">
            <div class="actions"><button type="submit">Delete</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Delete image"),
        src = image_src(owned, image),
        title = escape(title_of(image)),
        scope = escape(&image.scope),
        action = images_path(owned, Some("delete")),
        id = escape(&image.identifier),
        cancel = images_path(owned, None)
    );

    page("Delete image", Some(user), flash, &body)
}
