use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use async_trait::async_trait;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use uuid::Uuid;
use crate::store::{ExerciseFilter, Store, StoreError};
use crate::{Exercise, User};

pub type UsersByName = Arc<RwLock<HashMap<String, User>>>;
pub type UserExercises = Arc<RwLock<HashMap<Uuid, Vec<Exercise>>>>;

/// in-process `Store`, used by `--in-memory` runs and tests.
///
/// exercises are kept per user in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: UsersByName,
    exercises: UserExercises,
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Poisoned(name))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Poisoned(name))
}

impl MemoryStore {
    pub fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(read(&self.users, "users")?.contains_key(username))
    }

    /// `None` until the user's first exercise is stored
    pub fn n_exercises(&self, user_id: &Uuid) -> Result<Option<usize>, StoreError> {
        Ok(read(&self.exercises, "exercises")?
            .get(user_id)
            .map(|xs| xs.len()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        // check and insert under one write lock, so concurrent registrations of a name see exactly one winner
        let mut users = write(&self.users, "users")?;
        match users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(format!("username {:?}", user.username))),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users, "users")?.get(username).cloned())
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> Result<(), StoreError> {
        write(&self.exercises, "exercises")?
            .entry(exercise.user_id)
            .or_default()
            .push(exercise.clone());
        Ok(())
    }

    async fn find_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, StoreError> {
        let exercises = read(&self.exercises, "exercises")?;
        let user_exercises = match exercises.get(&filter.user_id) {
            Some(xs) => xs,
            None => return Ok(Vec::new()),
        };
        let limit = filter.limit.unwrap_or(usize::MAX);
        let items = user_exercises.iter()
            .filter(|x| filter.matches(x))
            .take(limit)
            .cloned()
            .collect();
        Ok(items)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(read(&self.users, "users")?.len() as u64)
    }

    async fn count_exercises(&self) -> Result<u64, StoreError> {
        let n: usize = read(&self.exercises, "exercises")?
            .values()
            .map(|xs| xs.len())
            .sum();
        Ok(n as u64)
    }
}
