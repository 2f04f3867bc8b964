//! Occurrence operations

use super::attributes::delete_entity_attributes;
use super::{RetrievalMode, TopicStore};
use crate::models::Occurrence;
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

fn occurrence_from_row(row: &SqliteRow) -> Occurrence {
    Occurrence {
        identifier: row.get("identifier"),
        instance_of: row.get("instance_of"),
        topic_identifier: row.get("topic_identifier"),
        scope: row.get("scope"),
        resource_ref: row.get("resource_ref"),
        attributes: Vec::new(),
    }
}

/// Occurrence counts for one topic, keyed by instance-of
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceStatistics {
    counts: HashMap<String, i64>,
}

impl OccurrenceStatistics {
    pub fn count(&self, instance_of: &str) -> i64 {
        self.counts.get(instance_of).copied().unwrap_or(0)
    }
}

impl TopicStore {
    /// Persist an occurrence (its attributes are written separately)
    pub async fn set_occurrence(&self, map_identifier: i64, occurrence: &Occurrence) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO occurrences (
                map_identifier, identifier, instance_of, topic_identifier, scope, resource_ref
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(map_identifier)
        .bind(&occurrence.identifier)
        .bind(&occurrence.instance_of)
        .bind(&occurrence.topic_identifier)
        .bind(&occurrence.scope)
        .bind(&occurrence.resource_ref)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_occurrence(
        &self,
        map_identifier: i64,
        occurrence_identifier: &str,
        mode: RetrievalMode,
    ) -> Result<Option<Occurrence>> {
        let row = sqlx::query(
            r#"
            SELECT identifier, instance_of, topic_identifier, scope, resource_ref
            FROM occurrences
            WHERE map_identifier = ? AND identifier = ?
            "#,
        )
        .bind(map_identifier)
        .bind(occurrence_identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut occurrence = occurrence_from_row(&row);
        if mode == RetrievalMode::ResolveAttributes {
            occurrence.attributes = self
                .get_attributes(map_identifier, &occurrence.identifier)
                .await?;
        }

        Ok(Some(occurrence))
    }

    /// Occurrences of one kind attached to a topic, in insertion order
    pub async fn get_topic_occurrences(
        &self,
        map_identifier: i64,
        topic_identifier: &str,
        instance_of: &str,
        mode: RetrievalMode,
    ) -> Result<Vec<Occurrence>> {
        let rows = sqlx::query(
            r#"
            SELECT identifier, instance_of, topic_identifier, scope, resource_ref
            FROM occurrences
            WHERE map_identifier = ? AND topic_identifier = ? AND instance_of = ?
            ORDER BY rowid
            "#,
        )
        .bind(map_identifier)
        .bind(topic_identifier)
        .bind(instance_of)
        .fetch_all(&self.pool)
        .await?;

        let mut occurrences: Vec<Occurrence> = rows.iter().map(occurrence_from_row).collect();
        if mode == RetrievalMode::ResolveAttributes {
            for occurrence in &mut occurrences {
                occurrence.attributes = self
                    .get_attributes(map_identifier, &occurrence.identifier)
                    .await?;
            }
        }

        Ok(occurrences)
    }

    pub async fn get_topic_occurrences_statistics(
        &self,
        map_identifier: i64,
        topic_identifier: &str,
    ) -> Result<OccurrenceStatistics> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT instance_of, COUNT(*)
            FROM occurrences
            WHERE map_identifier = ? AND topic_identifier = ?
            GROUP BY instance_of
            "#,
        )
        .bind(map_identifier)
        .bind(topic_identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(OccurrenceStatistics {
            counts: rows.into_iter().collect(),
        })
    }

    pub async fn update_occurrence_scope(
        &self,
        map_identifier: i64,
        occurrence_identifier: &str,
        scope: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE occurrences SET scope = ? WHERE map_identifier = ? AND identifier = ?",
        )
        .bind(scope)
        .bind(map_identifier)
        .bind(occurrence_identifier)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("occurrence {}", occurrence_identifier)));
        }
        Ok(())
    }

    /// Delete an occurrence and its attributes
    pub async fn delete_occurrence(
        &self,
        map_identifier: i64,
        occurrence_identifier: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        delete_entity_attributes(&mut tx, map_identifier, occurrence_identifier).await?;
        sqlx::query("DELETE FROM occurrences WHERE map_identifier = ? AND identifier = ?")
            .bind(map_identifier)
            .bind(occurrence_identifier)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
