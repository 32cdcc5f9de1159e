//! persistence abstraction shared by the postgres and in-memory backends.

use std::time::Duration;
use async_trait::async_trait;
use chrono::prelude::*;
use uuid::Uuid;
use crate::validate::LogQuery;
use crate::{Exercise, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// conjunctive filter over one user's exercises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub user_id: Uuid,
    /// inclusive lower bound on `date`
    pub start: Option<DateTime<Utc>>,
    /// exclusive upper bound on `date`
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ExerciseFilter {
    /// translate a validated log query into store bounds.
    ///
    /// `to` names a whole calendar day, so the exclusive end is pushed one day past it.
    pub fn from_log_query(user_id: Uuid, query: &LogQuery) -> Self {
        let end = query.to.and_then(|to| to.checked_add_signed(chrono::Duration::days(1)));
        Self {
            user_id,
            start: query.from,
            end,
            limit: query.limit,
        }
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        exercise.user_id == self.user_id
            && self.start.map_or(true, |start| exercise.date >= start)
            && self.end.map_or(true, |end| exercise.date < end)
    }
}

impl From<Uuid> for ExerciseFilter {
    fn from(user_id: Uuid) -> Self {
        Self {
            user_id,
            start: None,
            end: None,
            limit: None,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// short name used in logs
    fn backend(&self) -> &'static str;

    /// fails with `StoreError::UniqueViolation` when the username is taken
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn insert_exercise(&self, exercise: &Exercise) -> Result<(), StoreError>;

    /// matching exercises in insertion order, truncated to `filter.limit`
    async fn find_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;

    async fn count_exercises(&self) -> Result<u64, StoreError>;
}

#[allow(unused)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_query_end_bound_covers_the_whole_to_day() {
        let user_id = Uuid::new_v4();
        let query = LogQuery {
            username: "alice".into(),
            from: Some(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0)),
            to: Some(Utc.ymd(2021, 7, 29).and_hms(0, 0, 0)),
            limit: Some(2),
        };
        let filter = ExerciseFilter::from_log_query(user_id, &query);
        assert_eq!(filter.start, Some(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0)));
        assert_eq!(filter.end, Some(Utc.ymd(2021, 7, 30).and_hms(0, 0, 0)));
        assert_eq!(filter.limit, Some(2));

        let at = |t: DateTime<Utc>| Exercise { user_id, description: "run".into(), duration: 30, date: t };
        assert!(!filter.matches(&at(Utc.ymd(2021, 7, 26).and_hms(23, 59, 59))));
        assert!(filter.matches(&at(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0))));
        assert!(filter.matches(&at(Utc.ymd(2021, 7, 29).and_hms(0, 0, 0))));
        assert!(filter.matches(&at(Utc.ymd(2021, 7, 29).and_hms(23, 59, 59))));
        assert!(!filter.matches(&at(Utc.ymd(2021, 7, 30).and_hms(0, 0, 0))));

        let mut other_user = at(Utc.ymd(2021, 7, 28).and_hms(0, 0, 0));
        other_user.user_id = Uuid::new_v4();
        assert!(!filter.matches(&other_user));
    }

    #[test]
    fn open_filter_matches_everything_for_the_user() {
        let user_id = Uuid::new_v4();
        let filter = ExerciseFilter::from(user_id);
        let e = Exercise { user_id, description: "swim".into(), duration: 45, date: Utc::now() };
        assert!(filter.matches(&e));
    }
}
