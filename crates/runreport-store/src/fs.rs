// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local-filesystem implementation of [`ObjectLocation`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{LocationRef, ObjectLocation, StoreError};

/// A location on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLocation {
    path: PathBuf,
}

impl FsLocation {
    /// Create a location handle for the given path.
    pub fn new(path: impl Into<PathBuf>) -> LocationRef {
        Arc::new(Self { path: path.into() })
    }

    /// The filesystem path of this location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound { uri: self.uri() }
        } else {
            StoreError::Io {
                uri: self.uri(),
                source,
            }
        }
    }
}

#[async_trait]
impl ObjectLocation for FsLocation {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn append(&self, child: &str) -> LocationRef {
        Arc::new(Self {
            path: self.path.join(child),
        })
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_err(e))?)
    }

    async fn list(&self) -> Result<Vec<LocationRef>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;
        let mut children: Vec<LocationRef> = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_err(e))? {
            children.push(Arc::new(Self { path: entry.path() }));
        }
        children.sort_by_key(|c| c.name());
        Ok(children)
    }

    async fn mkdirs(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.path)
            .await
            .map_err(|e| self.io_err(e))
    }

    async fn create_new(&self) -> Result<bool, StoreError> {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(_) => {
                debug!(uri = %self.uri(), "created marker");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(self.io_err(e)),
        }
    }

    async fn read(&self) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(&self.path).await.map_err(|e| self.io_err(e))
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.io_err(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_location() -> (tempfile::TempDir, LocationRef) {
        let dir = tempfile::tempdir().unwrap();
        let loc = FsLocation::new(dir.path());
        (dir, loc)
    }

    #[tokio::test]
    async fn test_append_is_pure_path_arithmetic() {
        let (_dir, base) = temp_location();
        let child = base.append("a").append("b");
        assert_eq!(child.name(), "b");
        assert!(!child.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_new_is_exclusive() {
        let (_dir, base) = temp_location();
        let marker = base.append("_SUCCESS");
        assert!(marker.create_new().await.unwrap());
        // Second create must not succeed
        assert!(!marker.create_new().await.unwrap());
        assert!(marker.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let (_dir, base) = temp_location();
        let file = base.append("COUNT");
        file.write(b"42").await.unwrap();
        assert_eq!(file.read().await.unwrap(), b"42");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, base) = temp_location();
        let err = base.append("absent").read().await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (_dir, base) = temp_location();
        for name in ["b", "a", "c"] {
            base.append(name).mkdirs().await.unwrap();
        }
        let names: Vec<String> = base.list().await.unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mkdirs_creates_parents() {
        let (_dir, base) = temp_location();
        let nested = base.append("x").append("y").append("z");
        nested.mkdirs().await.unwrap();
        assert!(nested.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_uri_and_name() {
        let (_dir, base) = temp_location();
        let child = base.append("reports");
        assert_eq!(child.name(), "reports");
        assert!(child.uri().starts_with("file://"));
        assert!(child.uri().ends_with("/reports"));
    }
}
