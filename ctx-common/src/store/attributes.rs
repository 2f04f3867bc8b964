//! Attribute operations

use super::TopicStore;
use crate::models::Attribute;
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

pub(super) fn attribute_from_row(row: &SqliteRow) -> Result<Attribute> {
    let data_type: String = row.get("data_type");

    Ok(Attribute {
        identifier: row.get("identifier"),
        entity_identifier: row.get("entity_identifier"),
        name: row.get("name"),
        value: row.get("value"),
        data_type: data_type.parse()?,
        scope: row.get("scope"),
        language: row.get("language"),
    })
}

/// Delete every attribute of an entity inside an open transaction
pub(super) async fn delete_entity_attributes(
    conn: &mut SqliteConnection,
    map_identifier: i64,
    entity_identifier: &str,
) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM attributes WHERE map_identifier = ? AND entity_identifier = ?",
    )
    .bind(map_identifier)
    .bind(entity_identifier)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

impl TopicStore {
    pub async fn set_attribute(&self, map_identifier: i64, attribute: &Attribute) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attributes (
                map_identifier, identifier, entity_identifier, name, value, data_type, scope, language
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(map_identifier)
        .bind(&attribute.identifier)
        .bind(&attribute.entity_identifier)
        .bind(&attribute.name)
        .bind(&attribute.value)
        .bind(attribute.data_type.as_str())
        .bind(&attribute.scope)
        .bind(&attribute.language)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_attributes(&self, map_identifier: i64, attributes: &[Attribute]) -> Result<()> {
        for attribute in attributes {
            self.set_attribute(map_identifier, attribute).await?;
        }
        Ok(())
    }

    /// Attributes of one entity, ordered by name
    pub async fn get_attributes(
        &self,
        map_identifier: i64,
        entity_identifier: &str,
    ) -> Result<Vec<Attribute>> {
        let rows = sqlx::query(
            r#"
            SELECT identifier, entity_identifier, name, value, data_type, scope, language
            FROM attributes
            WHERE map_identifier = ? AND entity_identifier = ?
            ORDER BY name, identifier
            "#,
        )
        .bind(map_identifier)
        .bind(entity_identifier)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attribute_from_row).collect()
    }

    pub async fn update_attribute_value(
        &self,
        map_identifier: i64,
        attribute_identifier: &str,
        value: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE attributes SET value = ? WHERE map_identifier = ? AND identifier = ?",
        )
        .bind(value)
        .bind(map_identifier)
        .bind(attribute_identifier)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("attribute {}", attribute_identifier)));
        }
        Ok(())
    }
}
