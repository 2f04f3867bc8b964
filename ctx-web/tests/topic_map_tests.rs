//! HTTP tests for maps, topics, home, health and error pages

mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_text, setup};
use ctx_common::RetrievalMode;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ctx-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_home_page_is_public() {
    let app = setup().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/auth/login"));
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = setup().await;

    let response = app.get("/no/such/page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("404 Page not found"));
}

#[tokio::test]
async fn test_create_map_and_list_it() {
    let app = setup().await;
    let user = app.login("owner@example.org").await;

    let response = app
        .post_form("/maps/create", Some(&user), &[("map-name", ""), ("map-description", "x")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Name is required."));

    let response = app
        .post_form(
            "/maps/create",
            Some(&user),
            &[("map-name", "Programming"), ("map-description", "Languages & tools")],
        )
        .await;
    assert_redirect(&response, "/maps");

    let body = body_text(app.get("/maps", Some(&user)).await).await;
    assert!(body.contains("Topic map successfully created."));
    assert!(body.contains("Programming"));
    assert!(body.contains("Languages &amp; tools"));

    let maps = app.state.store.get_topic_maps(user.identifier).await.unwrap();
    assert_eq!(maps.len(), 1);
    assert!(app
        .state
        .store
        .topic_exists(maps[0].identifier, "home")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_maps_are_listed_per_user() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let other = app.login("other@example.org").await;
    app.create_map(&owner).await;

    let body = body_text(app.get("/maps", Some(&other)).await).await;
    assert!(body.contains("You have no topic maps yet."));
}

#[tokio::test]
async fn test_view_topic_shows_occurrence_counts() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    app.post_form(
        &format!("/links/add/{}/rust", map),
        Some(&owner),
        &[("link-title", "Rust"), ("link-url", "https://www.rust-lang.org")],
    )
    .await;

    let response = app.get(&format!("/topics/view/{}/rust", map), Some(&owner)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(&format!(r#"<a href="/links/{}/rust">Links</a></td><td>1</td>"#, map)));
    assert!(body.contains(&format!(r#"<a href="/images/{}/rust">Images</a></td><td>0</td>"#, map)));
}

#[tokio::test]
async fn test_create_topic() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    let response = app
        .post_form(
            &format!("/topics/create/{}/rust", map),
            Some(&owner),
            &[
                ("topic-identifier", "Borrow Checker"),
                ("topic-name", "Borrow checker"),
                ("topic-instance-of", ""),
            ],
        )
        .await;
    assert_redirect(&response, &format!("/topics/view/{}/borrow-checker", map));

    let topic = app
        .state
        .store
        .get_topic(map, "borrow-checker", RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
        .expect("Topic should exist");
    assert_eq!(topic.name, "Borrow checker");
    assert_eq!(topic.instance_of, "topic");
    let timestamp = topic.get_attribute_by_name("creation-timestamp").unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(&timestamp.value).is_ok());

    let body = body_text(
        app.get(&format!("/links/{}/borrow-checker", map), Some(&owner))
            .await,
    )
    .await;
    assert!(!body.contains("Created: Undefined"));
}

#[tokio::test]
async fn test_create_topic_validation_bits() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    let response = app
        .post_form(
            &format!("/topics/create/{}/rust", map),
            Some(&owner),
            &[
                ("topic-identifier", "rust"),
                ("topic-name", ""),
                ("topic-instance-of", "no-such-type"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("A topic with this identifier already exists."));
    assert!(body.contains("Name is required."));
    assert!(body.contains("Instance-of topic does not exist."));
    assert!(!body.contains("Identifier is required."));
}

#[tokio::test]
async fn test_change_scope_rejects_unknown_topic() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    let response = app
        .post_form(
            &format!("/topics/scope/{}/rust", map),
            Some(&owner),
            &[("scope", "nowhere")],
        )
        .await;
    assert_redirect(&response, &format!("/topics/view/{}/rust", map));

    let body = body_text(app.get(&format!("/topics/view/{}/rust", map), Some(&owner)).await).await;
    assert!(body.contains("Scope topic &#x27;nowhere&#x27; does not exist."));
    assert!(body.contains(r#"name="scope" value="*""#));
}

#[tokio::test]
async fn test_topic_pages_require_ownership() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let intruder = app.login("intruder@example.org").await;
    let map = app.create_map(&owner).await;

    let response = app
        .get(&format!("/topics/view/{}/rust", map), Some(&intruder))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get(&format!("/topics/view/{}/rust", map), None).await;
    assert_redirect(&response, "/auth/login");
}

#[tokio::test]
async fn test_unparsable_map_identifier_is_not_found() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    app.create_map(&owner).await;

    for uri in [
        "/topics/view/not-a-map/rust",
        "/associations/not-a-map/rust",
        "/images/delete/12abc/rust/some-image",
    ] {
        let response = app.get(uri, Some(&owner)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(body_text(response).await.contains("404 Page not found"));
    }
}

#[tokio::test]
async fn test_non_owner_post_is_forbidden_before_body_parsing() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let intruder = app.login("intruder@example.org").await;
    let map = app.create_map(&owner).await;

    for uri in [
        format!("/topics/create/{}/rust", map),
        format!("/topics/scope/{}/rust", map),
        format!("/associations/add/{}/rust", map),
    ] {
        let response = app
            .post_raw(&uri, Some(&intruder), "application/json", "{}")
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}
