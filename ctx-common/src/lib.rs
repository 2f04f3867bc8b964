//! # Contextualise Common Library
//!
//! Shared code for the Contextualise topic map application:
//! - Topic map models and the SQLite-backed topic store
//! - Users, roles and sessions
//! - Configuration loading
//! - Database initialization

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use auth::UserStore;
pub use error::{Error, Result};
pub use store::{OccurrenceStatistics, RetrievalMode, TopicStore};
