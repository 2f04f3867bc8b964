//! Topic map models
//!
//! Topic maps own topics; topics own occurrences and take part in
//! associations; attributes hang off any of them by entity identifier.

use crate::Error;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Scope value meaning "applies everywhere"
pub const UNIVERSAL_SCOPE: &str = "*";

/// Topics every new map starts with: (identifier, name)
///
/// `*` backs the universal scope; the rest are the default instance-of and
/// role topics the forms fall back to.
pub const BASE_TOPICS: &[(&str, &str)] = &[
    ("base-topic", "Base Topic"),
    ("*", "Universal"),
    ("home", "Home"),
    ("topic", "Topic"),
    ("occurrence", "Occurrence"),
    ("association", "Association"),
    ("member", "Member"),
    ("url", "URL"),
    ("image", "Image"),
    ("video", "Video"),
    ("related", "Related"),
    ("navigation", "Navigation"),
    ("up", "Up"),
    ("down", "Down"),
    ("broader", "Broader"),
    ("narrower", "Narrower"),
    ("categorization", "Categorization"),
    ("category", "Category"),
];

/// Instance-of of the bootstrap topics
pub const BASE_TOPIC_TYPE: &str = "base-topic";

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Number,
    Timestamp,
    Boolean,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Timestamp => "timestamp",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            "timestamp" => Ok(DataType::Timestamp),
            "boolean" => Ok(DataType::Boolean),
            other => Err(Error::InvalidInput(format!("Unknown data type: {}", other))),
        }
    }
}

/// A user's topic map
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMap {
    pub identifier: i64,
    pub user_identifier: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

/// Typed name-value metadata attached to a topic, occurrence or association
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub identifier: String,
    pub entity_identifier: String,
    pub name: String,
    pub value: String,
    pub data_type: DataType,
    pub scope: String,
    pub language: String,
}

impl Attribute {
    /// New attribute in the universal scope with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        entity_identifier: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            entity_identifier: entity_identifier.into(),
            name: name.into(),
            value: value.into(),
            data_type,
            scope: UNIVERSAL_SCOPE.to_string(),
            language: "en".to_string(),
        }
    }
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes.iter().find(|attribute| attribute.name == name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub identifier: String,
    pub instance_of: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Topic {
    pub fn new(
        identifier: impl Into<String>,
        instance_of: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            instance_of: instance_of.into(),
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn get_attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }
}

/// A resource (link, image, video) attached to a topic
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub identifier: String,
    pub instance_of: String,
    pub topic_identifier: String,
    pub scope: String,
    pub resource_ref: String,
    pub attributes: Vec<Attribute>,
}

impl Occurrence {
    /// New occurrence with a fresh identifier
    pub fn new(
        instance_of: impl Into<String>,
        topic_identifier: impl Into<String>,
        scope: impl Into<String>,
        resource_ref: impl Into<String>,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            instance_of: instance_of.into(),
            topic_identifier: topic_identifier.into(),
            scope: scope.into(),
            resource_ref: resource_ref.into(),
            attributes: Vec::new(),
        }
    }

    pub fn get_attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }
}

/// One end of an association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub role_spec: String,
    pub topic_ref: String,
}

impl Member {
    pub fn new(role_spec: impl Into<String>, topic_ref: impl Into<String>) -> Self {
        Self {
            role_spec: role_spec.into(),
            topic_ref: topic_ref.into(),
        }
    }
}

/// A typed, scoped relationship between two topics
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub identifier: String,
    pub instance_of: String,
    pub scope: String,
    pub name: String,
    pub source: Member,
    pub destination: Member,
    pub attributes: Vec<Attribute>,
}

impl Association {
    pub fn new(
        instance_of: impl Into<String>,
        scope: impl Into<String>,
        name: impl Into<String>,
        source: Member,
        destination: Member,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            instance_of: instance_of.into(),
            scope: scope.into(),
            name: name.into(),
            source,
            destination,
            attributes: Vec::new(),
        }
    }

    pub fn has_member(&self, topic_identifier: &str) -> bool {
        self.source.topic_ref == topic_identifier || self.destination.topic_ref == topic_identifier
    }

    /// The member on the far side from `topic_identifier`
    pub fn other_member(&self, topic_identifier: &str) -> &Member {
        if self.source.topic_ref == topic_identifier {
            &self.destination
        } else {
            &self.source
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_round_trip_names() {
        for data_type in [
            DataType::String,
            DataType::Number,
            DataType::Timestamp,
            DataType::Boolean,
        ] {
            assert_eq!(data_type.as_str().parse::<DataType>().unwrap(), data_type);
        }
        assert!("geopoint".parse::<DataType>().is_err());
    }

    #[test]
    fn test_attribute_defaults_to_universal_scope() {
        let attribute = Attribute::new("title", "Rust", "occ-1", DataType::String);
        assert_eq!(attribute.scope, UNIVERSAL_SCOPE);
        assert_eq!(attribute.language, "en");
        assert_eq!(attribute.entity_identifier, "occ-1");
    }

    #[test]
    fn test_other_member() {
        let association = Association::new(
            "association",
            UNIVERSAL_SCOPE,
            "Undefined",
            Member::new("related", "rust"),
            Member::new("related", "cargo"),
        );
        assert!(association.has_member("cargo"));
        assert!(!association.has_member("python"));
        assert_eq!(association.other_member("rust").topic_ref, "cargo");
        assert_eq!(association.other_member("cargo").topic_ref, "rust");
    }

    #[test]
    fn test_base_topics_include_universal_scope() {
        assert!(BASE_TOPICS.iter().any(|(id, _)| *id == UNIVERSAL_SCOPE));
        assert!(BASE_TOPICS.iter().any(|(id, _)| *id == "related"));
    }
}
