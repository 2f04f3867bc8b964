//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates every table the topic
//! store and user store need. All statements are idempotent, so this runs on
//! every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Roles created at startup: (name, description)
pub const DEFAULT_ROLES: &[(&str, &str)] = &[("admin", "Administrator"), ("user", "End user")];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // sqlx enables foreign keys on every pooled connection by default
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    create_schema_version_table(&pool).await?;
    create_users_table(&pool).await?;
    create_roles_tables(&pool).await?;
    create_sessions_table(&pool).await?;
    create_topic_maps_table(&pool).await?;
    create_topics_table(&pool).await?;
    create_occurrences_table(&pool).await?;
    create_attributes_table(&pool).await?;
    create_associations_tables(&pool).await?;

    init_default_roles(&pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(&pool)
        .await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            identifier INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_roles_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            name TEXT PRIMARY KEY,
            description TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_identifier INTEGER NOT NULL REFERENCES users(identifier) ON DELETE CASCADE,
            role_name TEXT NOT NULL REFERENCES roles(name) ON DELETE CASCADE,
            PRIMARY KEY (user_identifier, role_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_identifier INTEGER NOT NULL REFERENCES users(identifier) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL,
            current_scope TEXT NOT NULL DEFAULT '*',
            flash_category TEXT,
            flash_message TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_topic_maps_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_maps (
            identifier INTEGER PRIMARY KEY AUTOINCREMENT,
            user_identifier INTEGER NOT NULL REFERENCES users(identifier) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_topics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            map_identifier INTEGER NOT NULL REFERENCES topic_maps(identifier) ON DELETE CASCADE,
            identifier TEXT NOT NULL,
            instance_of TEXT NOT NULL,
            name TEXT NOT NULL,
            PRIMARY KEY (map_identifier, identifier)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_occurrences_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS occurrences (
            map_identifier INTEGER NOT NULL REFERENCES topic_maps(identifier) ON DELETE CASCADE,
            identifier TEXT NOT NULL,
            instance_of TEXT NOT NULL,
            topic_identifier TEXT NOT NULL,
            scope TEXT NOT NULL DEFAULT '*',
            resource_ref TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (map_identifier, identifier)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_occurrences_topic ON occurrences (map_identifier, topic_identifier, instance_of)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_attributes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attributes (
            map_identifier INTEGER NOT NULL REFERENCES topic_maps(identifier) ON DELETE CASCADE,
            identifier TEXT NOT NULL,
            entity_identifier TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            data_type TEXT NOT NULL,
            scope TEXT NOT NULL DEFAULT '*',
            language TEXT NOT NULL DEFAULT 'en',
            PRIMARY KEY (map_identifier, identifier)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attributes_entity ON attributes (map_identifier, entity_identifier)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_associations_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS associations (
            map_identifier INTEGER NOT NULL REFERENCES topic_maps(identifier) ON DELETE CASCADE,
            identifier TEXT NOT NULL,
            instance_of TEXT NOT NULL,
            scope TEXT NOT NULL DEFAULT '*',
            name TEXT NOT NULL,
            PRIMARY KEY (map_identifier, identifier)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // position 0 = source member, 1 = destination member
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            map_identifier INTEGER NOT NULL,
            association_identifier TEXT NOT NULL,
            position INTEGER NOT NULL CHECK (position IN (0, 1)),
            role_spec TEXT NOT NULL,
            topic_ref TEXT NOT NULL,
            PRIMARY KEY (map_identifier, association_identifier, position),
            FOREIGN KEY (map_identifier, association_identifier)
                REFERENCES associations(map_identifier, identifier) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_members_topic ON members (map_identifier, topic_ref)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure the default roles exist
async fn init_default_roles(pool: &SqlitePool) -> Result<()> {
    for (name, description) in DEFAULT_ROLES {
        sqlx::query("INSERT OR IGNORE INTO roles (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
    }

    Ok(())
}
