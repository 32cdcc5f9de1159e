use std::convert::TryFrom;
use async_trait::async_trait;
use sqlx::{Pool, Executor};
use sqlx::postgres::Postgres;
use chrono::prelude::*;
use uuid::Uuid;
use crate::store::{ExerciseFilter, Store, StoreError};
use crate::{Exercise, User};

pub const SCHEMA_SQL: &str = include_str!("../sql/schema-postgresql.sql");

/// sqlstate for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// wrapper around postgres connection pool to encapsulate db-related functionality
#[derive(Clone)]
pub struct DataBase {
    pool: Pool<Postgres>,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

impl DataBase {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = Pool::<Postgres>::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// create tables and indexes if they are missing
    pub async fn apply_schema(&self) -> Result<(), sqlx::Error> {
        self.pool.execute(SCHEMA_SQL).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for DataBase {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("insert into users (user_id, username) values ($1, $2)")
            .bind(user.id)
            .bind(user.username.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::UniqueViolation(format!("username {:?}", user.username))
                } else {
                    StoreError::from(e)
                }
            })?;
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<(Uuid, String)> = sqlx::query_as(
                "select user_id, username \
                 from users \
                 where username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, username)| User { id, username }))
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> Result<(), StoreError> {
        sqlx::query(
                "insert into exercises (user_id, description, duration, exercise_date) values ($1, $2, $3, $4)"
            )
            .bind(exercise.user_id)
            .bind(exercise.description.as_str())
            .bind(exercise.duration)
            .bind(exercise.date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError> {
        // a null limit is `limit all`
        let limit: Option<i64> = filter.limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        let rows: Vec<(Uuid, String, i32, DateTime<Utc>)> = sqlx::query_as(
                "select user_id, description, duration, exercise_date \
                 from exercises \
                 where user_id = $1 \
                   and ($2::timestamptz is null or exercise_date >= $2) \
                   and ($3::timestamptz is null or exercise_date < $3) \
                 order by exercise_id \
                 limit $4")
            .bind(filter.user_id)
            .bind(filter.start)
            .bind(filter.end)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(user_id, description, duration, date)| {
            Exercise { user_id, description, duration, date }
        }).collect())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("select count(*) from users")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn count_exercises(&self) -> Result<u64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("select count(*) from exercises")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}
