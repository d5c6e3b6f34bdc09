// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Durable hierarchical location abstraction for runreport.
//!
//! The report engine never talks to a filesystem or object store directly.
//! Everything it persists — the original request, output rows, the row
//! count, and the terminal markers — goes through [`ObjectLocation`], a
//! small hierarchical location trait. A location is addressed by appending
//! child names to a base location, and the only state-changing primitive
//! that matters for correctness is [`ObjectLocation::create_new`]:
//! an atomic create-or-fail, so a marker can never be half-written over
//! or silently replaced by a second writer.
//!
//! [`FsLocation`] is the local-filesystem backend used in production and
//! tests. Other backends (object stores) only need to honor the same
//! create-new semantics.

#![deny(missing_docs)]

/// Local-filesystem backend for [`ObjectLocation`].
pub mod fs;

pub use self::fs::FsLocation;

use std::sync::Arc;

use async_trait::async_trait;

/// Shared handle to a location.
pub type LocationRef = Arc<dyn ObjectLocation>;

/// Errors from location operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The location does not exist.
    #[error("location '{uri}' not found")]
    NotFound {
        /// URI of the missing location.
        uri: String,
    },

    /// An underlying I/O operation failed.
    #[error("i/o error at '{uri}': {source}")]
    Io {
        /// URI of the location the operation targeted.
        uri: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A durable, hierarchically addressed storage location.
///
/// Locations are cheap handles; nothing is touched on the backing store
/// until an async operation is called. `append` is pure path arithmetic.
#[async_trait]
pub trait ObjectLocation: Send + Sync {
    /// Last path component of this location.
    fn name(&self) -> String;

    /// Full URI of this location, for diagnostics.
    fn uri(&self) -> String;

    /// Child location under this one. Does not touch the backing store.
    fn append(&self, child: &str) -> LocationRef;

    /// Whether this location exists.
    async fn exists(&self) -> Result<bool, StoreError>;

    /// List child locations, sorted ascending by name.
    async fn list(&self) -> Result<Vec<LocationRef>, StoreError>;

    /// Create this location as a directory, including missing parents.
    async fn mkdirs(&self) -> Result<(), StoreError>;

    /// Atomically create this location as an empty file.
    ///
    /// Returns `Ok(true)` if the file was created, `Ok(false)` if it
    /// already existed. Two concurrent callers can never both observe
    /// `true` for the same location.
    async fn create_new(&self) -> Result<bool, StoreError>;

    /// Read the full contents of this location.
    async fn read(&self) -> Result<Vec<u8>, StoreError>;

    /// Replace the contents of this location.
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;
}
