//! Topic operations

use super::{RetrievalMode, TopicStore};
use crate::models::Topic;
use crate::Result;
use sqlx::Row;

impl TopicStore {
    /// Persist a topic together with its attributes
    pub async fn set_topic(&self, map_identifier: i64, topic: &Topic) -> Result<()> {
        sqlx::query(
            "INSERT INTO topics (map_identifier, identifier, instance_of, name) VALUES (?, ?, ?, ?)",
        )
        .bind(map_identifier)
        .bind(&topic.identifier)
        .bind(&topic.instance_of)
        .bind(&topic.name)
        .execute(&self.pool)
        .await?;

        self.set_attributes(map_identifier, &topic.attributes).await
    }

    pub async fn get_topic(
        &self,
        map_identifier: i64,
        topic_identifier: &str,
        mode: RetrievalMode,
    ) -> Result<Option<Topic>> {
        let row = sqlx::query(
            "SELECT identifier, instance_of, name FROM topics WHERE map_identifier = ? AND identifier = ?",
        )
        .bind(map_identifier)
        .bind(topic_identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut topic = Topic::new(
            row.get::<String, _>("identifier"),
            row.get::<String, _>("instance_of"),
            row.get::<String, _>("name"),
        );
        if mode == RetrievalMode::ResolveAttributes {
            topic.attributes = self.get_attributes(map_identifier, &topic.identifier).await?;
        }

        Ok(Some(topic))
    }

    pub async fn topic_exists(&self, map_identifier: i64, topic_identifier: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM topics WHERE map_identifier = ? AND identifier = ?)",
        )
        .bind(map_identifier)
        .bind(topic_identifier)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
