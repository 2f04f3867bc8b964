//! Topic store tests against a temporary SQLite database

use ctx_common::db::init_database;
use ctx_common::models::{
    Association, Attribute, DataType, Member, Occurrence, Topic, BASE_TOPICS, UNIVERSAL_SCOPE,
};
use ctx_common::{Error, RetrievalMode, TopicStore, UserStore};
use tempfile::TempDir;

struct Fixture {
    store: TopicStore,
    map_identifier: i64,
    user_identifier: i64,
    _dir: TempDir,
}

async fn setup() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("contextualise.db"), 2)
        .await
        .unwrap();

    let users = UserStore::new(pool.clone());
    let user = users
        .create_user("owner@example.org", "Passw0rd1", &["user"])
        .await
        .unwrap();

    let store = TopicStore::new(pool);
    let map_identifier = store
        .create_topic_map(user.identifier, "Rust", "Systems programming")
        .await
        .unwrap();

    store
        .set_topic(map_identifier, &Topic::new("cargo", "topic", "Cargo"))
        .await
        .unwrap();

    Fixture {
        store,
        map_identifier,
        user_identifier: user.identifier,
        _dir: dir,
    }
}

async fn add_link(fixture: &Fixture, title: &str, url: &str) -> Occurrence {
    let occurrence = Occurrence::new("url", "cargo", UNIVERSAL_SCOPE, url);
    fixture
        .store
        .set_occurrence(fixture.map_identifier, &occurrence)
        .await
        .unwrap();
    fixture
        .store
        .set_attribute(
            fixture.map_identifier,
            &Attribute::new("title", title, &occurrence.identifier, DataType::String),
        )
        .await
        .unwrap();
    occurrence
}

#[tokio::test]
async fn test_new_map_bootstraps_base_topics() {
    let fixture = setup().await;

    for (identifier, _) in BASE_TOPICS {
        assert!(
            fixture
                .store
                .topic_exists(fixture.map_identifier, identifier)
                .await
                .unwrap(),
            "missing base topic {}",
            identifier
        );
    }

    let topic_map = fixture
        .store
        .get_topic_map(fixture.map_identifier)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(topic_map.user_identifier, fixture.user_identifier);
    assert_eq!(topic_map.name, "Rust");

    let maps = fixture.store.get_topic_maps(fixture.user_identifier).await.unwrap();
    assert_eq!(maps.len(), 1);
}

#[tokio::test]
async fn test_missing_entities_are_none() {
    let fixture = setup().await;

    assert!(fixture.store.get_topic_map(9999).await.unwrap().is_none());
    assert!(fixture
        .store
        .get_topic(fixture.map_identifier, "python", RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .is_none());
    assert!(!fixture
        .store
        .topic_exists(fixture.map_identifier, "python")
        .await
        .unwrap());
    assert!(fixture
        .store
        .get_occurrence(fixture.map_identifier, "nope", RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_topic_attributes_resolved_on_request() {
    let fixture = setup().await;
    let mut topic = Topic::new("crates-io", "topic", "crates.io");
    topic.attributes.push(Attribute::new(
        "creation-timestamp",
        "2024-01-01T00:00:00+00:00",
        "crates-io",
        DataType::Timestamp,
    ));
    fixture.store.set_topic(fixture.map_identifier, &topic).await.unwrap();

    let resolved = fixture
        .store
        .get_topic(fixture.map_identifier, "crates-io", RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .unwrap();
    let created = resolved.get_attribute_by_name("creation-timestamp").unwrap();
    assert_eq!(created.data_type, DataType::Timestamp);

    let bare = fixture
        .store
        .get_topic(fixture.map_identifier, "crates-io", RetrievalMode::DontResolveAttributes)
        .await
        .unwrap()
        .unwrap();
    assert!(bare.attributes.is_empty());
}

#[tokio::test]
async fn test_occurrence_lifecycle() {
    let fixture = setup().await;
    let link = add_link(&fixture, "Docs", "https://doc.rust-lang.org/cargo").await;
    add_link(&fixture, "Book", "https://doc.rust-lang.org/book").await;

    let links = fixture
        .store
        .get_topic_occurrences(fixture.map_identifier, "cargo", "url", RetrievalMode::ResolveAttributes)
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].get_attribute_by_name("title").unwrap().value, "Docs");

    let title = links[0].get_attribute_by_name("title").unwrap();
    fixture
        .store
        .update_attribute_value(fixture.map_identifier, &title.identifier, "Cargo Docs")
        .await
        .unwrap();
    fixture
        .store
        .update_occurrence_scope(fixture.map_identifier, &link.identifier, "home")
        .await
        .unwrap();

    let updated = fixture
        .store
        .get_occurrence(fixture.map_identifier, &link.identifier, RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.scope, "home");
    assert_eq!(updated.get_attribute_by_name("title").unwrap().value, "Cargo Docs");

    fixture
        .store
        .delete_occurrence(fixture.map_identifier, &link.identifier)
        .await
        .unwrap();

    let remaining = fixture
        .store
        .get_topic_occurrences(fixture.map_identifier, "cargo", "url", RetrievalMode::DontResolveAttributes)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(fixture
        .store
        .get_attributes(fixture.map_identifier, &link.identifier)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_occurrence_statistics() {
    let fixture = setup().await;
    add_link(&fixture, "Docs", "https://doc.rust-lang.org/cargo").await;
    let video = Occurrence::new("video", "cargo", UNIVERSAL_SCOPE, "https://youtu.be/x");
    fixture.store.set_occurrence(fixture.map_identifier, &video).await.unwrap();

    let stats = fixture
        .store
        .get_topic_occurrences_statistics(fixture.map_identifier, "cargo")
        .await
        .unwrap();
    assert_eq!(stats.count("url"), 1);
    assert_eq!(stats.count("video"), 1);
    assert_eq!(stats.count("image"), 0);
}

#[tokio::test]
async fn test_updates_on_missing_rows_are_not_found() {
    let fixture = setup().await;

    let result = fixture
        .store
        .update_occurrence_scope(fixture.map_identifier, "missing", "*")
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = fixture
        .store
        .update_attribute_value(fixture.map_identifier, "missing", "x")
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_association_lifecycle() {
    let fixture = setup().await;
    let association = Association::new(
        "association",
        UNIVERSAL_SCOPE,
        "Package manager",
        Member::new("related", "home"),
        Member::new("related", "cargo"),
    );
    fixture
        .store
        .set_association(fixture.map_identifier, &association)
        .await
        .unwrap();

    for topic in ["home", "cargo"] {
        let found = fixture
            .store
            .get_topic_associations(fixture.map_identifier, topic, RetrievalMode::DontResolveAttributes)
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "topic {} should see the association", topic);
        assert_eq!(found[0].destination.topic_ref, "cargo");
    }

    fixture
        .store
        .update_association_name(fixture.map_identifier, &association.identifier, "Build tool")
        .await
        .unwrap();
    fixture
        .store
        .update_association_scope(fixture.map_identifier, &association.identifier, "home")
        .await
        .unwrap();

    let stored = fixture
        .store
        .get_association(fixture.map_identifier, &association.identifier, RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Build tool");
    assert_eq!(stored.scope, "home");
    assert_eq!(stored.source, Member::new("related", "home"));

    fixture
        .store
        .delete_association(fixture.map_identifier, &association.identifier)
        .await
        .unwrap();
    assert!(fixture
        .store
        .get_association(fixture.map_identifier, &association.identifier, RetrievalMode::DontResolveAttributes)
        .await
        .unwrap()
        .is_none());
}
