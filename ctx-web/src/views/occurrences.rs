//! Link and video pages
//!
//! Both kinds render through the same functions; [`UrlResource`] supplies
//! the labels, paths and form field names.

use ctx_common::auth::{Flash, User};
use ctx_common::models::Occurrence;

use super::topics::topic_header;
use super::{escape, page, text_input};
use crate::api::url_occurrences::UrlResource;
use crate::changes::TITLE_ATTRIBUTE;
use crate::guard::OwnedTopic;
use crate::validation::{is_web_url, FormErrors};

pub const TITLE_EMPTY: u32 = 1;
pub const URL_EMPTY: u32 = 2;
pub const ADD_SCOPE_MISSING: u32 = 4;
pub const URL_NOT_WEB: u32 = 8;
pub const EDIT_SCOPE_MISSING: u32 = 2;

/// Title attribute value, empty when the occurrence has none
pub fn title_of(occurrence: &Occurrence) -> &str {
    occurrence
        .get_attribute_by_name(TITLE_ATTRIBUTE)
        .map(|attribute| attribute.value.as_str())
        .unwrap_or("")
}

/// Entered values of the add and edit forms
#[derive(Debug, Clone, Default)]
pub struct UrlForm {
    pub title: String,
    pub url: String,
    pub scope: String,
}

impl UrlForm {
    pub fn from_occurrence(occurrence: &Occurrence) -> Self {
        Self {
            title: title_of(occurrence).to_string(),
            url: occurrence.resource_ref.clone(),
            scope: occurrence.scope.clone(),
        }
    }
}

/// Clickable link for http(s) URLs, plain text for anything else
fn url_link(url: &str, text: &str) -> String {
    if is_web_url(url) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape(url),
            escape(text)
        )
    } else {
        escape(text)
    }
}

fn resource_base(resource: UrlResource, owned: &OwnedTopic) -> String {
    format!(
        "/{}/{}/{}",
        resource.path(),
        owned.map_identifier(),
        escape(&owned.topic.identifier)
    )
}

fn action_path(resource: UrlResource, action: &str, owned: &OwnedTopic) -> String {
    format!(
        "/{}/{}/{}/{}",
        resource.path(),
        action,
        owned.map_identifier(),
        escape(&owned.topic.identifier)
    )
}

pub fn index_page(
    user: &User,
    flash: Option<&Flash>,
    resource: UrlResource,
    owned: &OwnedTopic,
    occurrences: &[Occurrence],
) -> String {
    let listing = if occurrences.is_empty() {
        format!(
            r#"<p class="muted">This topic has no {}.</p>"#,
            resource.path()
        )
    } else {
        let rows: String = occurrences
            .iter()
            .map(|occurrence| {
                format!(
                    r#"<tr>
                    <td>{link}</td>
                    <td>{scope}</td>
                    <td><a href="{edit}/{id}">Edit</a> <a href="{delete}/{id}">Delete</a></td>
                </tr>"#,
                    link = url_link(&occurrence.resource_ref, title_of(occurrence)),
                    scope = escape(&occurrence.scope),
                    edit = action_path(resource, "edit", owned),
                    delete = action_path(resource, "delete", owned),
                    id = escape(&occurrence.identifier)
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Title</th><th>Scope</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let body = format!(
        r#"{header}
        {listing}
        <p class="actions"><a href="{add}">Add {kind}</a></p>"#,
        header = topic_header(owned, resource.plural_label()),
        listing = listing,
        add = action_path(resource, "add", owned),
        kind = resource.label().to_lowercase()
    );

    page(resource.plural_label(), Some(user), flash, &body)
}

pub fn add_page(
    user: &User,
    flash: Option<&Flash>,
    resource: UrlResource,
    owned: &OwnedTopic,
    form: &UrlForm,
    errors: FormErrors,
) -> String {
    let title = format!("Add {}", resource.label().to_lowercase());

    let body = format!(
        r#"{header}
        <form method="post" action="{action}">
            {title_input}
            {url_input}
            {scope_input}
            <div class="actions"><button type="submit">Add</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, &title),
        action = action_path(resource, "add", owned),
        title_input = text_input(
            &resource.field("title"),
            "Title",
            &form.title,
            errors,
            &[(TITLE_EMPTY, "Title is required.")]
        ),
        url_input = text_input(
            &resource.field("url"),
            "URL",
            &form.url,
            errors,
            &[
                (URL_EMPTY, "URL is required."),
                (URL_NOT_WEB, "URL must be an http or https address."),
            ]
        ),
        scope_input = text_input(
            &resource.field("scope"),
            "Scope",
            &form.scope,
            errors,
            &[(ADD_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        cancel = resource_base(resource, owned)
    );

    page(&title, Some(user), flash, &body)
}

pub fn edit_page(
    user: &User,
    flash: Option<&Flash>,
    resource: UrlResource,
    owned: &OwnedTopic,
    occurrence_identifier: &str,
    form: &UrlForm,
    errors: FormErrors,
) -> String {
    let title = format!("Edit {}", resource.label().to_lowercase());

    let body = format!(
        r#"{header}
        <form method="post" action="{action}/{id}">
            {title_input}
            <label>URL</label>
            <p>{url}</p>
            {scope_input}
            <div class="actions"><button type="submit">Update</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, &title),
        action = action_path(resource, "edit", owned),
        id = escape(occurrence_identifier),
        title_input = text_input(
            &resource.field("title"),
            "Title",
            &form.title,
            errors,
            &[(TITLE_EMPTY, "Title is required.")]
        ),
        url = url_link(&form.url, &form.url),
        scope_input = text_input(
            &resource.field("scope"),
            "Scope",
            &form.scope,
            errors,
            &[(EDIT_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        cancel = resource_base(resource, owned)
    );

    page(&title, Some(user), flash, &body)
}

pub fn delete_page(
    user: &User,
    flash: Option<&Flash>,
    resource: UrlResource,
    owned: &OwnedTopic,
    occurrence: &Occurrence,
) -> String {
    let title = format!("Delete {}", resource.label().to_lowercase());

    let body = format!(
        r#"{header}
        <p>Are you sure you want to delete this {kind}?</p>
        <table><tbody>
            <tr><th>Title</th><td>{occurrence_title}</td></tr>
            <tr><th>URL</th><td>{url}</td></tr>
            <tr><th>Scope</th><td>{scope}</td></tr>
        </tbody></table>
        <form method="post" action="{action}/{id}">
            <div class="actions"><button type="submit">Delete</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, &title),
        kind = resource.label().to_lowercase(),
        occurrence_title = escape(title_of(occurrence)),
        url = escape(&occurrence.resource_ref),
        scope = escape(&occurrence.scope),
        action = action_path(resource, "delete", owned),
        id = escape(&occurrence.identifier),
        cancel = resource_base(resource, owned)
    );

    page(&title, Some(user), flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_link_only_for_web_urls() {
        assert_eq!(
            url_link("https://crates.io", "Crates"),
            r#"<a href="https://crates.io" target="_blank" rel="noopener">Crates</a>"#
        );
        assert_eq!(url_link("javascript:alert(1)", "Bad <link>"), "Bad &lt;link&gt;");
    }
}
