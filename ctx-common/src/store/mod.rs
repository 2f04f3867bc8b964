//! SQLite-backed topic store
//!
//! The web layer's only door to persistence. Operations mirror what the
//! controllers need: fetch a map, check a topic exists, read and write
//! occurrences, attributes and associations, and issue targeted updates.
//!
//! Each call borrows a pooled connection for the duration of the query;
//! operations touching several rows run inside one transaction.

mod associations;
mod attributes;
mod maps;
mod occurrences;
mod topics;

use sqlx::SqlitePool;

pub use occurrences::OccurrenceStatistics;

/// Whether reads also load the entity's attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    ResolveAttributes,
    DontResolveAttributes,
}

/// Topic store handle (cheap to clone)
#[derive(Clone)]
pub struct TopicStore {
    pool: SqlitePool,
}

impl TopicStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
