//! Ownership guard shared by every controller
//!
//! A topic map is visible and writable only to the user who owns it. The
//! check runs on every request; nothing is cached.

use ctx_common::models::{Association, Occurrence, Topic, TopicMap};
use ctx_common::RetrievalMode;
use tracing::warn;

use crate::session::CurrentUser;
use crate::{AppError, AppResult, AppState};

/// Fetch a map and require that `user` owns it
///
/// Missing map → `NotFound`; another user's map → `Forbidden`.
pub async fn owned_map(
    state: &AppState,
    user: &CurrentUser,
    map_identifier: i64,
) -> AppResult<TopicMap> {
    let topic_map = state
        .store
        .get_topic_map(map_identifier)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("topic map {}", map_identifier)))?;

    if topic_map.user_identifier != user.identifier() {
        warn!(
            "User {} denied access to topic map {} owned by user {}",
            user.identifier(),
            map_identifier,
            topic_map.user_identifier
        );
        return Err(AppError::Forbidden(format!("topic map {}", map_identifier)));
    }

    Ok(topic_map)
}

/// An owned map together with one of its topics
#[derive(Debug, Clone)]
pub struct OwnedTopic {
    pub topic_map: TopicMap,
    pub topic: Topic,
}

impl OwnedTopic {
    pub fn map_identifier(&self) -> i64 {
        self.topic_map.identifier
    }
}

/// [`owned_map`] plus the topic (attributes resolved); missing topic → `NotFound`
pub async fn owned_topic(
    state: &AppState,
    user: &CurrentUser,
    map_identifier: i64,
    topic_identifier: &str,
) -> AppResult<OwnedTopic> {
    let topic_map = owned_map(state, user, map_identifier).await?;

    let topic = state
        .store
        .get_topic(map_identifier, topic_identifier, RetrievalMode::ResolveAttributes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("topic {}", topic_identifier)))?;

    Ok(OwnedTopic { topic_map, topic })
}

/// Load an occurrence of the given kind attached to the owned topic
///
/// An occurrence that exists but hangs off another topic or has another
/// kind is reported as missing.
pub async fn topic_occurrence(
    state: &AppState,
    owned: &OwnedTopic,
    instance_of: &str,
    occurrence_identifier: &str,
) -> AppResult<Occurrence> {
    state
        .store
        .get_occurrence(
            owned.map_identifier(),
            occurrence_identifier,
            RetrievalMode::ResolveAttributes,
        )
        .await?
        .filter(|occurrence| {
            occurrence.topic_identifier == owned.topic.identifier
                && occurrence.instance_of == instance_of
        })
        .ok_or_else(|| AppError::NotFound(format!("occurrence {}", occurrence_identifier)))
}

/// Load an association in which the owned topic is a member
pub async fn topic_association(
    state: &AppState,
    owned: &OwnedTopic,
    association_identifier: &str,
) -> AppResult<Association> {
    state
        .store
        .get_association(
            owned.map_identifier(),
            association_identifier,
            RetrievalMode::ResolveAttributes,
        )
        .await?
        .filter(|association| association.has_member(&owned.topic.identifier))
        .ok_or_else(|| AppError::NotFound(format!("association {}", association_identifier)))
}
