//! Edit planning
//!
//! Edits compare submitted values against the stored entity and produce
//! the minimal list of targeted updates. Planning is pure; applying talks
//! to the store, one call per planned update.

use ctx_common::models::{Association, Attribute, DataType, Occurrence};
use ctx_common::{Result, TopicStore};

/// Attribute holding an occurrence's display title
pub const TITLE_ATTRIBUTE: &str = "title";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceUpdate {
    /// Set the title; `attribute` is the existing title attribute, if any
    Title {
        attribute: Option<String>,
        value: String,
    },
    Scope(String),
}

/// Updates needed to bring `stored` to the submitted title and scope
pub fn plan_occurrence_update(stored: &Occurrence, title: &str, scope: &str) -> Vec<OccurrenceUpdate> {
    let mut updates = Vec::new();

    let current_title = stored.get_attribute_by_name(TITLE_ATTRIBUTE);
    if current_title.map(|a| a.value.as_str()) != Some(title) {
        updates.push(OccurrenceUpdate::Title {
            attribute: current_title.map(|a| a.identifier.clone()),
            value: title.to_string(),
        });
    }

    if stored.scope != scope {
        updates.push(OccurrenceUpdate::Scope(scope.to_string()));
    }

    updates
}

pub async fn apply_occurrence_updates(
    store: &TopicStore,
    map_identifier: i64,
    occurrence: &Occurrence,
    updates: &[OccurrenceUpdate],
) -> Result<()> {
    for update in updates {
        match update {
            OccurrenceUpdate::Title {
                attribute: Some(attribute),
                value,
            } => {
                store
                    .update_attribute_value(map_identifier, attribute, value)
                    .await?
            }
            OccurrenceUpdate::Title {
                attribute: None,
                value,
            } => {
                let attribute = Attribute::new(
                    TITLE_ATTRIBUTE,
                    value.as_str(),
                    occurrence.identifier.as_str(),
                    DataType::String,
                );
                store.set_attribute(map_identifier, &attribute).await?
            }
            OccurrenceUpdate::Scope(scope) => {
                store
                    .update_occurrence_scope(map_identifier, &occurrence.identifier, scope)
                    .await?
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationUpdate {
    Name(String),
    Scope(String),
}

pub fn plan_association_update(stored: &Association, name: &str, scope: &str) -> Vec<AssociationUpdate> {
    let mut updates = Vec::new();
    if stored.name != name {
        updates.push(AssociationUpdate::Name(name.to_string()));
    }
    if stored.scope != scope {
        updates.push(AssociationUpdate::Scope(scope.to_string()));
    }
    updates
}

pub async fn apply_association_updates(
    store: &TopicStore,
    map_identifier: i64,
    association: &Association,
    updates: &[AssociationUpdate],
) -> Result<()> {
    for update in updates {
        match update {
            AssociationUpdate::Name(name) => {
                store
                    .update_association_name(map_identifier, &association.identifier, name)
                    .await?
            }
            AssociationUpdate::Scope(scope) => {
                store
                    .update_association_scope(map_identifier, &association.identifier, scope)
                    .await?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctx_common::models::Member;

    fn link(title: Option<&str>, scope: &str) -> Occurrence {
        let mut occurrence = Occurrence::new("url", "rust", scope, "https://www.rust-lang.org");
        if let Some(title) = title {
            occurrence.attributes.push(Attribute::new(
                TITLE_ATTRIBUTE,
                title,
                occurrence.identifier.clone(),
                DataType::String,
            ));
        }
        occurrence
    }

    #[test]
    fn test_unchanged_occurrence_plans_nothing() {
        let stored = link(Some("Rust"), "*");
        assert!(plan_occurrence_update(&stored, "Rust", "*").is_empty());
    }

    #[test]
    fn test_changed_scope_only() {
        let stored = link(Some("Rust"), "*");
        assert_eq!(
            plan_occurrence_update(&stored, "Rust", "home"),
            vec![OccurrenceUpdate::Scope("home".to_string())]
        );
    }

    #[test]
    fn test_changed_title_targets_existing_attribute() {
        let stored = link(Some("Rust"), "*");
        let attribute = stored.attributes[0].identifier.clone();

        assert_eq!(
            plan_occurrence_update(&stored, "The Rust Language", "*"),
            vec![OccurrenceUpdate::Title {
                attribute: Some(attribute),
                value: "The Rust Language".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_title_attribute_is_created() {
        let stored = link(None, "*");
        assert_eq!(
            plan_occurrence_update(&stored, "Rust", "*"),
            vec![OccurrenceUpdate::Title {
                attribute: None,
                value: "Rust".to_string(),
            }]
        );
    }

    #[test]
    fn test_association_plan() {
        let stored = Association::new(
            "association",
            "*",
            "Undefined",
            Member::new("related", "rust"),
            Member::new("related", "cargo"),
        );

        assert!(plan_association_update(&stored, "Undefined", "*").is_empty());
        assert_eq!(
            plan_association_update(&stored, "Build tool", "home"),
            vec![
                AssociationUpdate::Name("Build tool".to_string()),
                AssociationUpdate::Scope("home".to_string()),
            ]
        );
    }
}
