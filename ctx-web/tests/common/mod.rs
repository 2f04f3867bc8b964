//! Shared setup for HTTP integration tests
//!
//! Each test gets its own temporary root folder, database and router.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use ctx_common::config::{Config, TomlConfig};
use ctx_common::db::init_database;
use ctx_common::models::Topic;
use ctx_common::{TopicStore, UserStore};
use ctx_web::{build_router, AppState};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

pub const PASSWORD: &str = "Passw0rd1";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// A logged-in user and the Cookie header carrying their session
pub struct TestUser {
    pub identifier: i64,
    pub cookie: String,
}

pub async fn setup() -> TestApp {
    setup_with(TomlConfig::default()).await
}

pub async fn setup_with(toml: TomlConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_toml(toml, dir.path().to_path_buf()).unwrap();
    std::fs::create_dir_all(&config.resources_dir).unwrap();

    let pool = init_database(&config.database_path, 2).await.unwrap();
    let state = AppState::new(config, TopicStore::new(pool.clone()), UserStore::new(pool));
    let router = build_router(state.clone());

    TestApp {
        router,
        state,
        _dir: dir,
    }
}

impl TestApp {
    /// Create a user with a live session
    pub async fn login(&self, email: &str) -> TestUser {
        let user = self
            .state
            .users
            .create_user(email, PASSWORD, &["user"])
            .await
            .unwrap();
        let session = self
            .state
            .users
            .create_session(user.identifier, 3600)
            .await
            .unwrap();

        TestUser {
            identifier: user.identifier,
            cookie: format!("ctx_session={}", session.token),
        }
    }

    /// Topic map owned by `user` containing the topic `rust`
    pub async fn create_map(&self, user: &TestUser) -> i64 {
        let map_identifier = self
            .state
            .store
            .create_topic_map(user.identifier, "Programming", "")
            .await
            .unwrap();
        self.state
            .store
            .set_topic(map_identifier, &Topic::new("rust", "topic", "Rust"))
            .await
            .unwrap();
        map_identifier
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: Option<&TestUser>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, &user.cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        user: Option<&TestUser>,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, &user.cookie);
        }
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

impl TestApp {
    /// POST an arbitrary body with the given content type
    pub async fn post_raw(
        &self,
        uri: &str,
        user: Option<&TestUser>,
        content_type: &str,
        body: &'static str,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, &user.cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

/// Assert a 303 redirect to `location`
pub fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        location
    );
}
