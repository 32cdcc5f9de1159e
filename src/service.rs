use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use chrono::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;
use crate::store::{ExerciseFilter, Store, StoreError};
use crate::validate;
use crate::{AddExerciseRequest, Error, Exercise, ExerciseLogRequest, NewUserRequest, User};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// user registry, exercise log and log queries over an injected `Store`.
///
/// every store call is bounded by `timeout`; running out of time is a storage error.
#[derive(Clone)]
pub struct ExerciseLog {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl ExerciseLog {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
        where F: Future<Output = Result<T, StoreError>>
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_elapsed) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    pub async fn create_user(&self, username: &str) -> Result<User, Error> {
        let user = User::new(username);
        match self.bounded(self.store.insert_user(&user)).await {
            Ok(()) => {
                info!(user_id = %user.id, username, "registered user");
                Ok(user)
            }
            Err(StoreError::UniqueViolation(_)) => Err(Error::DuplicateUsername { username: username.to_string() }),
            Err(e) => Err(Error::Storage(e)),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<User, Error> {
        self.bounded(self.store.find_user_by_username(username)).await?
            .ok_or_else(|| Error::NotFound { username: username.to_string() })
    }

    /// appends an exercise for `user_id`, stamped "now" when `date` is `None`.
    ///
    /// does not check that `user_id` exists.
    pub async fn add_exercise(
        &self,
        user_id: Uuid,
        description: &str,
        duration: i32,
        date: Option<DateTime<Utc>>,
    ) -> Result<Exercise, Error> {
        let exercise = Exercise {
            user_id,
            description: description.to_string(),
            duration,
            date: date.unwrap_or_else(Utc::now),
        };
        self.bounded(self.store.insert_exercise(&exercise)).await?;
        Ok(exercise)
    }

    pub async fn query_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, Error> {
        let items = self.bounded(self.store.find_exercises(filter)).await?;
        Ok(items)
    }

    /// `POST /api/exercise/new-user/`
    pub async fn register(&self, req: &NewUserRequest) -> Result<User, Error> {
        let cmd = validate::new_user(req)?;
        self.create_user(&cmd.username).await
    }

    /// `POST /api/exercise/add`
    pub async fn log_exercise(&self, req: &AddExerciseRequest) -> Result<Exercise, Error> {
        let cmd = validate::new_exercise(req)?;
        let user = self.find_user_by_username(&cmd.username).await?;
        let exercise = self.add_exercise(user.id, &cmd.description, cmd.duration, cmd.date).await?;
        debug!(user_id = %user.id, duration = exercise.duration, date = %exercise.date, "logged exercise");
        Ok(exercise)
    }

    /// `GET /api/exercise/log`
    pub async fn exercise_log(&self, req: &ExerciseLogRequest) -> Result<Vec<Exercise>, Error> {
        let query = validate::log_query(req)?;
        let user = self.find_user_by_username(&query.username).await?;
        let filter = ExerciseFilter::from_log_query(user.id, &query);
        self.query_exercises(&filter).await
    }
}
