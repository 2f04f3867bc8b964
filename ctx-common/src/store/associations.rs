//! Association operations

use super::attributes::delete_entity_attributes;
use super::{RetrievalMode, TopicStore};
use crate::models::{Association, Member};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const SOURCE: i64 = 0;
const DESTINATION: i64 = 1;

// One row per association: both members joined in
const SELECT_ASSOCIATIONS: &str = r#"
    SELECT a.identifier, a.instance_of, a.scope, a.name,
           src.role_spec AS src_role_spec, src.topic_ref AS src_topic_ref,
           dest.role_spec AS dest_role_spec, dest.topic_ref AS dest_topic_ref
    FROM associations a
    JOIN members src
      ON src.map_identifier = a.map_identifier
     AND src.association_identifier = a.identifier
     AND src.position = 0
    JOIN members dest
      ON dest.map_identifier = a.map_identifier
     AND dest.association_identifier = a.identifier
     AND dest.position = 1
"#;

fn association_from_row(row: &SqliteRow) -> Association {
    Association {
        identifier: row.get("identifier"),
        instance_of: row.get("instance_of"),
        scope: row.get("scope"),
        name: row.get("name"),
        source: Member::new(
            row.get::<String, _>("src_role_spec"),
            row.get::<String, _>("src_topic_ref"),
        ),
        destination: Member::new(
            row.get::<String, _>("dest_role_spec"),
            row.get::<String, _>("dest_topic_ref"),
        ),
        attributes: Vec::new(),
    }
}

impl TopicStore {
    /// Persist an association and both of its members
    pub async fn set_association(&self, map_identifier: i64, association: &Association) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO associations (map_identifier, identifier, instance_of, scope, name) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(map_identifier)
        .bind(&association.identifier)
        .bind(&association.instance_of)
        .bind(&association.scope)
        .bind(&association.name)
        .execute(&mut *tx)
        .await?;

        for (position, member) in [
            (SOURCE, &association.source),
            (DESTINATION, &association.destination),
        ] {
            sqlx::query(
                r#"
                INSERT INTO members (map_identifier, association_identifier, position, role_spec, topic_ref)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(map_identifier)
            .bind(&association.identifier)
            .bind(position)
            .bind(&member.role_spec)
            .bind(&member.topic_ref)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_association(
        &self,
        map_identifier: i64,
        association_identifier: &str,
        mode: RetrievalMode,
    ) -> Result<Option<Association>> {
        let sql = format!(
            "{} WHERE a.map_identifier = ? AND a.identifier = ?",
            SELECT_ASSOCIATIONS
        );
        let row = sqlx::query(&sql)
            .bind(map_identifier)
            .bind(association_identifier)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut association = association_from_row(&row);
        if mode == RetrievalMode::ResolveAttributes {
            association.attributes = self
                .get_attributes(map_identifier, &association.identifier)
                .await?;
        }

        Ok(Some(association))
    }

    /// Associations in which the topic plays either role
    pub async fn get_topic_associations(
        &self,
        map_identifier: i64,
        topic_identifier: &str,
        mode: RetrievalMode,
    ) -> Result<Vec<Association>> {
        let sql = format!(
            "{} WHERE a.map_identifier = ? AND (src.topic_ref = ? OR dest.topic_ref = ?) ORDER BY a.rowid",
            SELECT_ASSOCIATIONS
        );
        let rows = sqlx::query(&sql)
            .bind(map_identifier)
            .bind(topic_identifier)
            .bind(topic_identifier)
            .fetch_all(&self.pool)
            .await?;

        let mut associations: Vec<Association> = rows.iter().map(association_from_row).collect();
        if mode == RetrievalMode::ResolveAttributes {
            for association in &mut associations {
                association.attributes = self
                    .get_attributes(map_identifier, &association.identifier)
                    .await?;
            }
        }

        Ok(associations)
    }

    pub async fn update_association_name(
        &self,
        map_identifier: i64,
        association_identifier: &str,
        name: &str,
    ) -> Result<()> {
        self.update_association_column(map_identifier, association_identifier, "name", name)
            .await
    }

    pub async fn update_association_scope(
        &self,
        map_identifier: i64,
        association_identifier: &str,
        scope: &str,
    ) -> Result<()> {
        self.update_association_column(map_identifier, association_identifier, "scope", scope)
            .await
    }

    // `column` is always a literal from this module
    async fn update_association_column(
        &self,
        map_identifier: i64,
        association_identifier: &str,
        column: &str,
        value: &str,
    ) -> Result<()> {
        let sql = format!(
            "UPDATE associations SET {} = ? WHERE map_identifier = ? AND identifier = ?",
            column
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(map_identifier)
            .bind(association_identifier)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("association {}", association_identifier)));
        }
        Ok(())
    }

    /// Delete an association with its members and attributes
    pub async fn delete_association(
        &self,
        map_identifier: i64,
        association_identifier: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        delete_entity_attributes(&mut tx, map_identifier, association_identifier).await?;
        sqlx::query("DELETE FROM members WHERE map_identifier = ? AND association_identifier = ?")
            .bind(map_identifier)
            .bind(association_identifier)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM associations WHERE map_identifier = ? AND identifier = ?")
            .bind(map_identifier)
            .bind(association_identifier)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
