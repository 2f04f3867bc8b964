use ctx_common::auth::{Flash, User};
use ctx_common::models::Association;

use super::topics::topic_header;
use super::{escape, page, text_input};
use crate::guard::OwnedTopic;
use crate::validation::FormErrors;

pub const DEST_TOPIC_EMPTY: u32 = 1;
pub const DEST_TOPIC_MISSING: u32 = 2;
pub const ADD_SCOPE_MISSING: u32 = 4;
pub const INSTANCE_OF_MISSING: u32 = 8;
pub const SRC_ROLE_MISSING: u32 = 16;
pub const DEST_ROLE_MISSING: u32 = 32;

pub const NAME_EMPTY: u32 = 1;
pub const EDIT_SCOPE_MISSING: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct AssociationForm {
    pub dest_topic_ref: String,
    pub src_role_spec: String,
    pub dest_role_spec: String,
    pub instance_of: String,
    pub scope: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AssociationEditForm {
    pub name: String,
    pub scope: String,
}

fn associations_path(owned: &OwnedTopic, action: Option<&str>) -> String {
    let topic = escape(&owned.topic.identifier);
    match action {
        Some(action) => format!("/associations/{}/{}/{}", action, owned.map_identifier(), topic),
        None => format!("/associations/{}/{}", owned.map_identifier(), topic),
    }
}

fn summary(owned: &OwnedTopic, association: &Association) -> String {
    let other = association.other_member(&owned.topic.identifier);
    format!(
        r#"<td>{name}</td>
        <td>{instance_of}</td>
        <td><a href="/topics/view/{map}/{other}">{other}</a> <span class="muted">({role})</span></td>
        <td>{scope}</td>"#,
        name = escape(&association.name),
        instance_of = escape(&association.instance_of),
        map = owned.map_identifier(),
        other = escape(&other.topic_ref),
        role = escape(&other.role_spec),
        scope = escape(&association.scope)
    )
}

pub fn index_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    associations: &[Association],
) -> String {
    let listing = if associations.is_empty() {
        r#"<p class="muted">This topic has no associations.</p>"#.to_string()
    } else {
        let rows: String = associations
            .iter()
            .map(|association| {
                format!(
                    r#"<tr>{summary}<td><a href="{edit}/{id}">Edit</a> <a href="{delete}/{id}">Delete</a></td></tr>"#,
                    summary = summary(owned, association),
                    edit = associations_path(owned, Some("edit")),
                    delete = associations_path(owned, Some("delete")),
                    id = escape(&association.identifier)
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Name</th><th>Type</th><th>Associated topic</th><th>Scope</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let body = format!(
        r#"{header}
        {listing}
        <p class="actions"><a href="{add}">Add association</a></p>"#,
        header = topic_header(owned, "Associations"),
        listing = listing,
        add = associations_path(owned, Some("add"))
    );

    page("Associations", Some(user), flash, &body)
}

pub fn add_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    form: &AssociationForm,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"{header}
        <form method="post" action="{action}">
            {dest_topic}
            {src_role}
            {dest_role}
            {instance_of}
            {scope}
            {name}
            <div class="actions"><button type="submit">Add</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Add association"),
        action = associations_path(owned, Some("add")),
        dest_topic = text_input(
            "association-dest-topic-ref",
            "Associated topic",
            &form.dest_topic_ref,
            errors,
            &[
                (DEST_TOPIC_EMPTY, "Associated topic is required."),
                (DEST_TOPIC_MISSING, "Associated topic does not exist."),
            ]
        ),
        src_role = text_input(
            "association-src-role-spec",
            "Source role",
            &form.src_role_spec,
            errors,
            &[(SRC_ROLE_MISSING, "Source role topic does not exist.")]
        ),
        dest_role = text_input(
            "association-dest-role-spec",
            "Destination role",
            &form.dest_role_spec,
            errors,
            &[(DEST_ROLE_MISSING, "Destination role topic does not exist.")]
        ),
        instance_of = text_input(
            "association-instance-of",
            "Instance of",
            &form.instance_of,
            errors,
            &[(INSTANCE_OF_MISSING, "Instance-of topic does not exist.")]
        ),
        scope = text_input(
            "association-scope",
            "Scope",
            &form.scope,
            errors,
            &[(ADD_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        name = text_input("association-name", "Name", &form.name, errors, &[]),
        cancel = associations_path(owned, None)
    );

    page("Add association", Some(user), flash, &body)
}

pub fn edit_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    association: &Association,
    form: &AssociationEditForm,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"{header}
        <table><tbody><tr>{summary}</tr></tbody></table>
        <form method="post" action="{action}/{id}">
            {name}
            {scope}
            <div class="actions"><button type="submit">Update</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Edit association"),
        summary = summary(owned, association),
        action = associations_path(owned, Some("edit")),
        id = escape(&association.identifier),
        name = text_input(
            "association-name",
            "Name",
            &form.name,
            errors,
            &[(NAME_EMPTY, "Name is required.")]
        ),
        scope = text_input(
            "association-scope",
            "Scope",
            &form.scope,
            errors,
            &[(EDIT_SCOPE_MISSING, "Scope topic does not exist.")]
        ),
        cancel = associations_path(owned, None)
    );

    page("Edit association", Some(user), flash, &body)
}

pub fn delete_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    association: &Association,
) -> String {
    let body = format!(
        r#"{header}
        <p>Are you sure you want to delete this association?</p>
        <table><tbody><tr>{summary}</tr></tbody></table>
        <form method="post" action="{action}/{id}">
            <div class="actions"><button type="submit">Delete</button> <a href="{cancel}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Delete association"),
        summary = summary(owned, association),
        action = associations_path(owned, Some("delete")),
        id = escape(&association.identifier),
        cancel = associations_path(owned, None)
    );

    page("Delete association", Some(user), flash, &body)
}
