use chrono::DateTime;
use ctx_common::auth::{Flash, User};
use ctx_common::models::Topic;
use ctx_common::OccurrenceStatistics;

use super::{escape, page, text_input};
use crate::guard::OwnedTopic;
use crate::validation::FormErrors;

/// Attribute recording when a topic was created (RFC 3339)
pub const CREATION_TIMESTAMP_ATTRIBUTE: &str = "creation-timestamp";

pub const TOPIC_IDENTIFIER_EMPTY: u32 = 1;
pub const TOPIC_NAME_EMPTY: u32 = 2;
pub const TOPIC_ALREADY_EXISTS: u32 = 4;
pub const TOPIC_INSTANCE_OF_MISSING: u32 = 8;

/// Human-readable creation date, or `Undefined` when unknown
pub fn creation_date(topic: &Topic) -> String {
    topic
        .get_attribute_by_name(CREATION_TIMESTAMP_ATTRIBUTE)
        .and_then(|attribute| DateTime::parse_from_rfc3339(&attribute.value).ok())
        .map(|timestamp| timestamp.format("%a, %b %d, %Y").to_string())
        .unwrap_or_else(|| "Undefined".to_string())
}

/// Map / topic breadcrumb shown above every per-topic page
pub fn topic_header(owned: &OwnedTopic, section: &str) -> String {
    format!(
        r#"<p class="muted"><a href="/maps">Maps</a> / {map_name} / <a href="/topics/view/{map}/{topic}">{topic_name}</a></p>
        <h1>{section}</h1>
        <p class="muted">Created: {created}</p>"#,
        map_name = escape(&owned.topic_map.name),
        map = owned.map_identifier(),
        topic = escape(&owned.topic.identifier),
        topic_name = escape(&owned.topic.name),
        section = escape(section),
        created = escape(&creation_date(&owned.topic))
    )
}

pub fn topic_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    statistics: &OccurrenceStatistics,
    association_count: usize,
    current_scope: &str,
) -> String {
    let map = owned.map_identifier();
    let topic = escape(&owned.topic.identifier);

    let body = format!(
        r#"{header}
        <p class="muted">Instance of: {instance_of}</p>
        <table>
            <tbody>
                <tr><td><a href="/links/{map}/{topic}">Links</a></td><td>{links}</td></tr>
                <tr><td><a href="/images/{map}/{topic}">Images</a></td><td>{images}</td></tr>
                <tr><td><a href="/videos/{map}/{topic}">Videos</a></td><td>{videos}</td></tr>
                <tr><td><a href="/associations/{map}/{topic}">Associations</a></td><td>{associations}</td></tr>
            </tbody>
        </table>
        <form method="post" action="/topics/scope/{map}/{topic}">
            <label for="scope">Current scope</label>
            <input type="text" id="scope" name="scope" value="{scope}">
            <div class="actions"><button type="submit">Change scope</button></div>
        </form>
        <p class="actions"><a href="/topics/create/{map}/{topic}">Create topic</a></p>"#,
        header = topic_header(owned, &owned.topic.name),
        instance_of = escape(&owned.topic.instance_of),
        map = map,
        topic = topic,
        links = statistics.count("url"),
        images = statistics.count("image"),
        videos = statistics.count("video"),
        associations = association_count,
        scope = escape(current_scope)
    );

    page(&owned.topic.name, Some(user), flash, &body)
}

/// Entered values of the create-topic form
#[derive(Debug, Clone, Default)]
pub struct TopicForm {
    pub identifier: String,
    pub name: String,
    pub instance_of: String,
}

pub fn create_topic_page(
    user: &User,
    flash: Option<&Flash>,
    owned: &OwnedTopic,
    form: &TopicForm,
    errors: FormErrors,
) -> String {
    let body = format!(
        r#"{header}
        <form method="post" action="/topics/create/{map}/{topic}">
            {identifier}
            {name}
            {instance_of}
            <div class="actions"><button type="submit">Create</button> <a href="/topics/view/{map}/{topic}">Cancel</a></div>
        </form>"#,
        header = topic_header(owned, "Create topic"),
        map = owned.map_identifier(),
        topic = escape(&owned.topic.identifier),
        identifier = text_input(
            "topic-identifier",
            "Identifier",
            &form.identifier,
            errors,
            &[
                (TOPIC_IDENTIFIER_EMPTY, "Identifier is required."),
                (TOPIC_ALREADY_EXISTS, "A topic with this identifier already exists."),
            ]
        ),
        name = text_input(
            "topic-name",
            "Name",
            &form.name,
            errors,
            &[(TOPIC_NAME_EMPTY, "Name is required.")]
        ),
        instance_of = text_input(
            "topic-instance-of",
            "Instance of",
            &form.instance_of,
            errors,
            &[(TOPIC_INSTANCE_OF_MISSING, "Instance-of topic does not exist.")]
        ),
    );

    page("Create topic", Some(user), flash, &body)
}
