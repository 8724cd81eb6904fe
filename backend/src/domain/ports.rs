//! Domain ports for the driven adapters.
//!
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of returning `anyhow::Result`. Fixture
//! implementations back tests and deployments without an external catalog.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::entity::{EntityDocument, EntityKind};
use super::user::UserRecord;

/// Failures surfaced by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Backing storage failed or is unavailable.
    #[error("user store failure: {message}")]
    Storage { message: String },
}

impl UserStoreError {
    /// Helper for storage failures.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`OrgFileStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrgFileError {
    /// The shared file does not exist yet.
    #[error("org file is missing: {message}")]
    Missing { message: String },
    /// Read or append failed.
    #[error("org file I/O failed: {message}")]
    Io { message: String },
}

impl OrgFileError {
    /// Helper for missing-file failures.
    pub fn missing(message: impl Into<String>) -> Self {
        Self::Missing {
            message: message.into(),
        }
    }

    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`CatalogClient`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog could not be reached.
    #[error("catalog request failed: {message}")]
    Transport { message: String },
    /// The catalog answered with a non-success status.
    #[error("catalog responded with status {status}: {message}")]
    Status { status: u16, message: String },
}

impl CatalogError {
    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for non-success responses.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

/// Persistence port for user records.
///
/// The users API depends only on this capability set so tests substitute an
/// in-memory fake without sharing process state.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All stored users in insertion order.
    async fn list(&self) -> Result<Vec<UserRecord>, UserStoreError>;

    /// Fetch a user by entity name.
    async fn find(&self, name: &str) -> Result<Option<UserRecord>, UserStoreError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserStoreError>;

    /// Store a new user.
    async fn insert(&self, user: UserRecord) -> Result<(), UserStoreError>;

    /// Replace the user stored under `name`.
    async fn update(&self, name: &str, user: UserRecord) -> Result<(), UserStoreError>;

    /// Remove and return the user stored under `name`.
    async fn remove(&self, name: &str) -> Result<Option<UserRecord>, UserStoreError>;
}

/// Port for the shared flat YAML file accumulating entity documents.
#[async_trait]
pub trait OrgFileStore: Send + Sync {
    /// Append one pre-separated document chunk to the file.
    async fn append(&self, document: &str) -> Result<(), OrgFileError>;

    /// Read the full file contents.
    async fn read_all(&self) -> Result<String, OrgFileError>;
}

/// Port for the external catalog service.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Target URLs of every registered location.
    async fn list_locations(&self) -> Result<Vec<String>, CatalogError>;

    /// Register a URL location with the catalog.
    async fn add_location(&self, target: &str) -> Result<(), CatalogError>;

    /// Ask the catalog to refresh a named entity.
    async fn refresh_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError>;

    /// Push an entity document directly into the catalog.
    async fn register_entity(&self, document: &EntityDocument) -> Result<(), CatalogError>;

    /// Remove a named entity from the catalog.
    async fn remove_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError>;
}

/// No-op catalog used when no catalog base URL is configured, and by tests.
pub struct FixtureCatalogClient;

#[async_trait]
impl CatalogClient for FixtureCatalogClient {
    async fn list_locations(&self) -> Result<Vec<String>, CatalogError> {
        Ok(Vec::new())
    }

    async fn add_location(&self, target: &str) -> Result<(), CatalogError> {
        debug!(target, "fixture catalog: add_location");
        Ok(())
    }

    async fn refresh_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError> {
        debug!(entity_ref = %kind.entity_ref(name), "fixture catalog: refresh_entity");
        Ok(())
    }

    async fn register_entity(&self, document: &EntityDocument) -> Result<(), CatalogError> {
        debug!(entity_ref = %document.entity_ref(), "fixture catalog: register_entity");
        Ok(())
    }

    async fn remove_entity(&self, kind: EntityKind, name: &str) -> Result<(), CatalogError> {
        debug!(entity_ref = %kind.entity_ref(name), "fixture catalog: remove_entity");
        Ok(())
    }
}

/// In-memory org file used by handler tests.
///
/// Mirrors the real adapter's observable behaviour: the file is missing
/// until the first append, and appends concatenate without deduplication.
#[derive(Default)]
pub struct FixtureOrgFileStore {
    contents: Mutex<Option<String>>,
}

impl FixtureOrgFileStore {
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, OrgFileError> {
        self.contents
            .lock()
            .map_err(|_| OrgFileError::io("org file fixture mutex poisoned"))
    }
}

#[async_trait]
impl OrgFileStore for FixtureOrgFileStore {
    async fn append(&self, document: &str) -> Result<(), OrgFileError> {
        let mut guard = self.guard()?;
        guard.get_or_insert_with(String::new).push_str(document);
        Ok(())
    }

    async fn read_all(&self) -> Result<String, OrgFileError> {
        self.guard()?
            .clone()
            .ok_or_else(|| OrgFileError::missing("org file has not been created"))
    }
}
