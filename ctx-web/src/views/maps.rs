use ctx_common::auth::{Flash, User};
use ctx_common::models::TopicMap;

use super::{escape, page, text_input};
use crate::validation::FormErrors;

pub const MAP_NAME_EMPTY: u32 = 1;

pub fn maps_page(user: &User, flash: Option<&Flash>, maps: &[TopicMap]) -> String {
    let listing = if maps.is_empty() {
        r#"<p class="muted">You have no topic maps yet.</p>"#.to_string()
    } else {
        let rows: String = maps
            .iter()
            .map(|map| {
                format!(
                    r#"<tr><td><a href="/topics/view/{id}/home">{name}</a></td><td>{description}</td><td class="muted">{created}</td></tr>"#,
                    id = map.identifier,
                    name = escape(&map.name),
                    description = escape(&map.description),
                    created = escape(&map.created_at)
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Name</th><th>Description</th><th>Created</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let body = format!(
        r#"<h1>Topic maps</h1>
        {listing}
        <p class="actions"><a href="/maps/create">Create topic map</a></p>"#,
        listing = listing
    );

    page("Topic maps", Some(user), flash, &body)
}

pub fn create_map_page(
    user: &User,
    flash: Option<&Flash>,
    name: &str,
    description: &str,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"<h1>Create topic map</h1>
        <form method="post" action="/maps/create">
            {name}
            <label for="map-description">Description</label>
            <textarea id="map-description" name="map-description" rows="4">{description}</textarea>
            <div class="actions"><button type="submit">Create</button> <a href="/maps">Cancel</a></div>
        </form>"#,
        name = text_input(
            "map-name",
            "Name",
            name,
            errors,
            &[(MAP_NAME_EMPTY, "Name is required.")]
        ),
        description = escape(description)
    );

    page("Create topic map", Some(user), flash, &body)
}
