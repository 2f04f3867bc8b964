//! Topic map operations

use super::TopicStore;
use crate::models::{TopicMap, BASE_TOPICS, BASE_TOPIC_TYPE};
use crate::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

fn topic_map_from_row(row: &SqliteRow) -> TopicMap {
    TopicMap {
        identifier: row.get("identifier"),
        user_identifier: row.get("user_identifier"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

impl TopicStore {
    /// Create a topic map owned by `user_identifier` and bootstrap its base topics
    ///
    /// Returns the new map's identifier.
    pub async fn create_topic_map(
        &self,
        user_identifier: i64,
        name: &str,
        description: &str,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let map_identifier: i64 = sqlx::query_scalar(
            "INSERT INTO topic_maps (user_identifier, name, description) VALUES (?, ?, ?) RETURNING identifier",
        )
        .bind(user_identifier)
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        for (identifier, topic_name) in BASE_TOPICS {
            sqlx::query(
                "INSERT INTO topics (map_identifier, identifier, instance_of, name) VALUES (?, ?, ?, ?)",
            )
            .bind(map_identifier)
            .bind(identifier)
            .bind(BASE_TOPIC_TYPE)
            .bind(topic_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Created topic map {} ('{}') for user {}",
            map_identifier, name, user_identifier
        );
        Ok(map_identifier)
    }

    pub async fn get_topic_map(&self, map_identifier: i64) -> Result<Option<TopicMap>> {
        let row = sqlx::query(
            r#"
            SELECT identifier, user_identifier, name, description, CAST(created_at AS TEXT) AS created_at
            FROM topic_maps
            WHERE identifier = ?
            "#,
        )
        .bind(map_identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(topic_map_from_row))
    }

    /// Maps owned by a user, oldest first
    pub async fn get_topic_maps(&self, user_identifier: i64) -> Result<Vec<TopicMap>> {
        let rows = sqlx::query(
            r#"
            SELECT identifier, user_identifier, name, description, CAST(created_at AS TEXT) AS created_at
            FROM topic_maps
            WHERE user_identifier = ?
            ORDER BY identifier
            "#,
        )
        .bind(user_identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(topic_map_from_row).collect())
    }
}
