//! Database initialization tests
//!
//! - Database file and parent directories are created on first run
//! - Re-opening an existing database is idempotent
//! - Default roles are seeded

use ctx_common::db::{init_database, DEFAULT_ROLES, SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("contextualise.db");

    let result = init_database(&db_path, 2).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("contextualise.db");

    let pool1 = init_database(&db_path, 2).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path, 2).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(&pool2.unwrap())
        .await
        .unwrap();
    assert_eq!(versions, vec![SCHEMA_VERSION]);
}

#[tokio::test]
async fn test_default_roles_initialized() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("contextualise.db"), 2).await.unwrap();

    let roles: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
        .fetch_all(&pool)
        .await
        .unwrap();

    assert_eq!(roles.len(), DEFAULT_ROLES.len());
    assert!(roles.contains(&"admin".to_string()));
    assert!(roles.contains(&"user".to_string()));
}
