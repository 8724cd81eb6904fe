//! In-memory user store.
//!
//! The store the service runs with by default: a mutex-guarded vector kept
//! in insertion order, isolated behind the [`UserStore`] port so handlers
//! and tests never touch shared process state directly.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::user::UserRecord;

/// Mutex-guarded in-memory [`UserStore`] implementation.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    fn guard(&self) -> Result<MutexGuard<'_, Vec<UserRecord>>, UserStoreError> {
        self.users
            .lock()
            .map_err(|_| UserStoreError::storage("user store mutex poisoned"))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        Ok(self.guard()?.clone())
    }

    async fn find(&self, name: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self
            .guard()?
            .iter()
            .find(|user| user.name().as_str() == name)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self
            .guard()?
            .iter()
            .find(|user| user.email().as_str() == email)
            .cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<(), UserStoreError> {
        self.guard()?.push(user);
        Ok(())
    }

    async fn update(&self, name: &str, user: UserRecord) -> Result<(), UserStoreError> {
        let mut users = self.guard()?;
        match users.iter_mut().find(|stored| stored.name().as_str() == name) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(UserStoreError::storage(format!(
                "no stored user named '{name}' to update"
            ))),
        }
    }

    async fn remove(&self, name: &str) -> Result<Option<UserRecord>, UserStoreError> {
        let mut users = self.guard()?;
        let index = users.iter().position(|user| user.name().as_str() == name);
        Ok(index.map(|index| users.remove(index)))
    }
}
