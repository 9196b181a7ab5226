//! Whole-document storage with conditional writes.
//!
//! The entire logbook lives in one hosted JSON document. A store hands out
//! snapshots tagged with a revision (a hash of the document content) and
//! only accepts writes conditional on the revision the writer fetched, so
//! a concurrent write becomes a detectable conflict instead of a silent
//! lost update.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::models::Logbook;

/// Errors from the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store id or credential missing from configuration.
    #[error("document store is not configured; set store_bin and store_key")]
    NotConfigured,

    /// Transport-level failure talking to the store.
    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered a read with a non-success status.
    #[error("document store read returned status {0}")]
    ReadStatus(u16),

    /// The store answered a write with a non-success status.
    #[error("document store write returned status {0}")]
    WriteStatus(u16),

    /// The stored document could not be decoded.
    #[error("failed to decode stored document: {0}")]
    Decode(#[source] serde_json::Error),

    /// The document could not be encoded for hashing or writing.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The document changed since it was fetched.
    #[error("document was modified concurrently (expected revision {expected}, found {actual})")]
    Conflict { expected: Revision, actual: Revision },
}

/// Content hash of a logbook's canonical JSON.
///
/// Equal content always yields an equal revision, so a no-op write carries
/// the same revision it was conditioned on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Computes the revision of a logbook.
    pub fn of(logbook: &Logbook) -> Result<Self, StoreError> {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use sha2::{Digest, Sha256};

        let bytes = serde_json::to_vec(logbook).map_err(StoreError::Encode)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = hasher.finalize();

        Ok(Self(URL_SAFE_NO_PAD.encode(hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetched document plus the revision it carried.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub logbook: Logbook,
    pub revision: Revision,
}

/// Storage for the logbook document.
///
/// Implementations read and write the document whole; partial updates do
/// not exist at this layer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the current document, bypassing any caches.
    async fn fetch(&self) -> Result<Snapshot, StoreError>;

    /// Writes the whole document if the store still holds `expected`.
    ///
    /// Returns the revision of the written document, or
    /// [`StoreError::Conflict`] if something else wrote in between.
    async fn put(&self, logbook: &Logbook, expected: &Revision) -> Result<Revision, StoreError>;
}
