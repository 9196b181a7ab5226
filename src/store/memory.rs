//! In-memory document store.
//!
//! Backs tests and throwaway local runs with the same conditional write
//! contract as the remote store, checked atomically under a lock.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DocumentStore, Revision, Snapshot, StoreError};
use crate::models::Logbook;

#[derive(Debug, Default)]
pub struct MemoryStore {
    current: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self) -> Result<Snapshot, StoreError> {
        let mut current = self.current.lock().await;

        match current.as_ref() {
            Some(snapshot) => Ok(snapshot.clone()),
            None => {
                let logbook = Logbook::new();
                let snapshot = Snapshot {
                    revision: Revision::of(&logbook)?,
                    logbook,
                };
                *current = Some(snapshot.clone());
                Ok(snapshot)
            }
        }
    }

    async fn put(&self, logbook: &Logbook, expected: &Revision) -> Result<Revision, StoreError> {
        let mut current = self.current.lock().await;

        let actual = match current.as_ref() {
            Some(snapshot) => snapshot.revision.clone(),
            None => Revision::of(&Logbook::new())?,
        };

        if actual != *expected {
            return Err(StoreError::Conflict {
                expected: expected.clone(),
                actual,
            });
        }

        let revision = Revision::of(logbook)?;
        *current = Some(Snapshot {
            logbook: logbook.clone(),
            revision: revision.clone(),
        });

        Ok(revision)
    }
}
