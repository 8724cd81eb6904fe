//! File-backed org file adapter.
//!
//! All access goes through a `cap_std` directory handle scoped to the org
//! file's parent directory. Appends are blocking writes with no locking;
//! concurrent writers race, matching the original service.

use std::ffi::OsString;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::{OrgFileError, OrgFileStore};

/// Org file store appending to a flat YAML file on disk.
pub struct FlatFileOrgStore {
    parent: PathBuf,
    file_name: OsString,
}

impl FlatFileOrgStore {
    /// Build a store for the given file path, creating the parent directory
    /// when it does not exist yet.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| io::Error::other(format!("org file path has no file name: {}", path.display())))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Dir::create_ambient_dir_all(&parent, ambient_authority())?;
        Ok(Self { parent, file_name })
    }

    fn open_dir(&self) -> Result<Dir, OrgFileError> {
        Dir::open_ambient_dir(&self.parent, ambient_authority())
            .map_err(|err| OrgFileError::io(err.to_string()))
    }
}

#[async_trait]
impl OrgFileStore for FlatFileOrgStore {
    async fn append(&self, document: &str) -> Result<(), OrgFileError> {
        let dir = self.open_dir()?;
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let mut file = dir
            .open_with(&self.file_name, &options)
            .map_err(|err| OrgFileError::io(err.to_string()))?;
        file.write_all(document.as_bytes())
            .map_err(|err| OrgFileError::io(err.to_string()))
    }

    async fn read_all(&self) -> Result<String, OrgFileError> {
        let dir = self.open_dir()?;
        dir.read_to_string(&self.file_name).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                OrgFileError::missing(err.to_string())
            } else {
                OrgFileError::io(err.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_creates_and_grows_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FlatFileOrgStore::new(dir.path().join("org.yaml")).expect("store");

        store.append("\n---\nkind: User\n").await.expect("first append");
        store.append("\n---\nkind: User\n").await.expect("second append");

        let contents = store.read_all().await.expect("contents");
        assert_eq!(contents.matches("kind: User").count(), 2);
    }

    #[tokio::test]
    async fn read_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FlatFileOrgStore::new(dir.path().join("org.yaml")).expect("store");
        assert!(matches!(
            store.read_all().await,
            Err(OrgFileError::Missing { .. })
        ));
    }

    #[tokio::test]
    async fn new_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("catalog").join("org.yaml");
        let store = FlatFileOrgStore::new(&nested).expect("store");
        store.append("\n---\nkind: Group\n").await.expect("append");
        assert!(nested.exists());
    }

    #[test]
    fn new_rejects_directory_paths() {
        assert!(FlatFileOrgStore::new("/").is_err());
    }
}
