use serde::{Serialize, Deserialize};
use chrono::prelude::*;
use uuid::Uuid;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod memory;
pub mod routes;
pub mod service;
pub mod store;
pub mod validate;

pub use api::*;
pub use error::{Error, ErrorKind};
pub use service::ExerciseLog;
pub use store::{Store, StoreError, ExerciseFilter};
pub use validate::{ValidationError, ValidationKind};

pub const USERNAME_MAX_LEN: usize = 10;
pub const DESCRIPTION_MAX_LEN: usize = 100;
pub const DURATION_MIN_MINUTES: i32 = 1;
pub const DURATION_MAX_MINUTES: i32 = 1440;

/// user representation matching `users` db table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// exercise representation matching `exercises` db table.
///
/// the table's sequence column (which fixes insertion order) is never exposed, so
/// this is also the projection returned by the log query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub user_id: Uuid,
    pub description: String,
    /// minutes
    pub duration: i32,
    pub date: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
        }
    }
}
