//! HTTP tests for the image controller

mod common;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use common::{assert_redirect, body_text, setup, TestApp, TestUser};
use ctx_common::models::Occurrence;
use ctx_common::RetrievalMode;

const BOUNDARY: &str = "ctx-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-not-really-an-image";

fn multipart_body(title: &str, scope: &str, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [("image-title", title), ("image-scope", scope)] {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image-file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(
    app: &TestApp,
    user: &TestUser,
    map: i64,
    title: &str,
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/images/add/{}/rust", map))
        .header(header::COOKIE, &user.cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(title, "", file)))
        .unwrap();
    app.send(request).await
}

async fn stored_images(app: &TestApp, map: i64) -> Vec<Occurrence> {
    app.state
        .store
        .get_topic_occurrences(map, "rust", "image", RetrievalMode::ResolveAttributes)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upload_stores_file_and_serves_it() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    let response = upload(&app, &owner, map, "Ferris", Some(("ferris.PNG", PNG_BYTES))).await;
    assert_redirect(&response, &format!("/images/{}/rust", map));

    let images = stored_images(&app, map).await;
    assert_eq!(images.len(), 1);
    let image = &images[0];
    assert_eq!(image.scope, "*");
    assert_eq!(image.resource_ref, format!("{}.png", image.identifier));

    let path = app
        .state
        .config
        .resources_dir
        .join(map.to_string())
        .join("rust")
        .join(&image.resource_ref);
    assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);

    let response = app
        .get(
            &format!("/resources/{}/rust/{}", map, image.resource_ref),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(app.get(&format!("/images/{}/rust", map), Some(&owner)).await).await;
    assert!(body.contains("Image successfully uploaded."));
    assert!(body.contains(&format!("/resources/{}/rust/{}", map, image.resource_ref)));
}

#[tokio::test]
async fn test_upload_validation() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    let response = upload(&app, &owner, map, "Notes", Some(("notes.txt", &b"hello"[..]))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Only png, jpg, jpeg, gif and webp images are allowed."));
    assert!(!body.contains("Select an image to upload."));

    let response = upload(&app, &owner, map, "", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Title is required."));
    assert!(body.contains("Select an image to upload."));
    assert!(!body.contains("Only png, jpg, jpeg, gif and webp images are allowed."));

    assert!(stored_images(&app, map).await.is_empty());
}

#[tokio::test]
async fn test_edit_image_title() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    upload(&app, &owner, map, "Ferris", Some(("ferris.png", PNG_BYTES))).await;
    let image = stored_images(&app, map).await.remove(0);

    let response = app
        .post_form(
            &format!("/images/edit/{}/rust/{}", map, image.identifier),
            Some(&owner),
            &[("image-title", "Ferris the crab"), ("image-scope", "")],
        )
        .await;
    assert_redirect(&response, &format!("/images/{}/rust", map));

    let image = stored_images(&app, map).await.remove(0);
    assert_eq!(
        image.get_attribute_by_name("title").unwrap().value,
        "Ferris the crab"
    );
}

#[tokio::test]
async fn test_delete_image_removes_file() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    upload(&app, &owner, map, "Ferris", Some(("ferris.png", PNG_BYTES))).await;
    let image = stored_images(&app, map).await.remove(0);
    let path = app
        .state
        .config
        .resources_dir
        .join(map.to_string())
        .join("rust")
        .join(&image.resource_ref);
    assert!(path.exists());

    let response = app
        .post_form(
            &format!("/images/delete/{}/rust/{}", map, image.identifier),
            Some(&owner),
            &[],
        )
        .await;
    assert_redirect(&response, &format!("/images/{}/rust", map));
    assert!(!path.exists());
    assert!(stored_images(&app, map).await.is_empty());
}

#[tokio::test]
async fn test_delete_image_with_missing_file() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    upload(&app, &owner, map, "Ferris", Some(("ferris.png", PNG_BYTES))).await;
    let image = stored_images(&app, map).await.remove(0);
    std::fs::remove_file(
        app.state
            .config
            .resources_dir
            .join(map.to_string())
            .join("rust")
            .join(&image.resource_ref),
    )
    .unwrap();

    let response = app
        .post_form(
            &format!("/images/delete/{}/rust/{}", map, image.identifier),
            Some(&owner),
            &[],
        )
        .await;
    assert_redirect(&response, &format!("/images/{}/rust", map));
    assert!(stored_images(&app, map).await.is_empty());
}

#[tokio::test]
async fn test_upload_to_other_users_map_is_forbidden() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let intruder = app.login("intruder@example.org").await;
    let map = app.create_map(&owner).await;

    let response = upload(&app, &intruder, map, "Ferris", Some(("ferris.png", PNG_BYTES))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(stored_images(&app, map).await.is_empty());
}

#[tokio::test]
async fn test_non_owner_upload_with_wrong_body_is_forbidden() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let intruder = app.login("intruder@example.org").await;
    let map = app.create_map(&owner).await;

    let response = app
        .post_raw(
            &format!("/images/add/{}/rust", map),
            Some(&intruder),
            "application/x-www-form-urlencoded",
            "image-title=Ferris",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_raw(
            &format!("/images/add/{}/rust", map),
            Some(&owner),
            "application/x-www-form-urlencoded",
            "image-title=Ferris",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_insert_leaves_no_file_behind() {
    let app = setup().await;
    let owner = app.login("owner@example.org").await;
    let map = app.create_map(&owner).await;

    sqlx::query(
        "CREATE TRIGGER reject_occurrences BEFORE INSERT ON occurrences \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(app.state.store.pool())
    .await
    .unwrap();

    let response = upload(&app, &owner, map, "Ferris", Some(("ferris.png", PNG_BYTES))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let directory = app
        .state
        .config
        .resources_dir
        .join(map.to_string())
        .join("rust");
    let leftovers = std::fs::read_dir(&directory)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
    assert!(stored_images(&app, map).await.is_empty());
}
