//! Exercise log operations.
//!
//! Every mutation rewrites the whole stored document: fetch the current
//! snapshot, change one account's entries, write the result back if the
//! store still holds the fetched revision. Writers for the same account are
//! serialized through a per-account mutex, so two in-process requests never
//! race each other; a write landing from outside the process shows up as a
//! revision conflict and triggers a bounded retry from a fresh snapshot.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{EntryId, Exercise, NewExercise};
use crate::revalidate::{Revalidator, ROOT_VIEW};
use crate::store::{DocumentStore, StoreError};

/// How many snapshots a mutation works through before giving up.
const MAX_WRITE_ATTEMPTS: u32 = 3;

#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every attempt found the document changed underneath it.
    #[error("gave up after {attempts} conflicting write attempts")]
    Contention { attempts: u32 },
}

/// One mutex per account, created on first use.
#[derive(Default)]
struct AccountLocks {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    fn lock_for(&self, account: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().unwrap().get(account) {
            return lock.clone();
        }
        let mut locks = self.locks.write().unwrap();
        locks.entry(account.to_string()).or_default().clone()
    }
}

/// The workout log service.
///
/// Reads go straight to the store. Mutations hold the account's lock across
/// the whole fetch/change/write cycle and signal view revalidation once the
/// write has been accepted.
pub struct ExerciseLog {
    store: Arc<dyn DocumentStore>,
    locks: AccountLocks,
    revalidator: Revalidator,
}

impl ExerciseLog {
    pub fn new(store: Arc<dyn DocumentStore>, revalidator: Revalidator) -> Self {
        Self {
            store,
            locks: AccountLocks::default(),
            revalidator,
        }
    }

    /// Returns every entry for an account, in storage order.
    ///
    /// Accounts with no history yield an empty list.
    pub async fn entries(&self, account: &str) -> Result<Vec<Exercise>, LogError> {
        let snapshot = self.store.fetch().await?;
        Ok(snapshot.logbook.entries(account).to_vec())
    }

    /// Appends a validated entry to an account's history.
    ///
    /// The entry id and date are assigned here, against the snapshot the
    /// write is based on, so a retry after a conflict re-allocates the id.
    pub async fn append(&self, account: &str, fields: NewExercise) -> Result<Exercise, LogError> {
        let lock = self.locks.lock_for(account);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let snapshot = self.store.fetch().await?;
            let mut logbook = snapshot.logbook;
            let entry = Exercise::log(logbook.allocate_id(account), fields.clone());
            logbook.append(account, entry.clone());

            match self.store.put(&logbook, &snapshot.revision).await {
                Ok(_) => {
                    tracing::debug!("appended entry {} for {}", entry.id, account);
                    self.revalidator.mark_stale(ROOT_VIEW);
                    return Ok(entry);
                }
                Err(StoreError::Conflict { .. }) if attempts < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!("append conflict for {}, retrying", account);
                }
                Err(StoreError::Conflict { .. }) => {
                    return Err(LogError::Contention { attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Removes an entry from an account's history.
    ///
    /// Removal is idempotent: an id that is not present, or an account with
    /// no history at all, reports success without an error. The whole
    /// document is only written back when the account exists.
    pub async fn delete(&self, account: &str, id: EntryId) -> Result<(), LogError> {
        let lock = self.locks.lock_for(account);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let snapshot = self.store.fetch().await?;
            let mut logbook = snapshot.logbook;
            if !logbook.has_account(account) {
                self.revalidator.mark_stale(ROOT_VIEW);
                return Ok(());
            }
            logbook.remove(account, id);

            match self.store.put(&logbook, &snapshot.revision).await {
                Ok(_) => {
                    tracing::debug!("removed entry {} for {}", id, account);
                    self.revalidator.mark_stale(ROOT_VIEW);
                    return Ok(());
                }
                Err(StoreError::Conflict { .. }) if attempts < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!("delete conflict for {}, retrying", account);
                }
                Err(StoreError::Conflict { .. }) => {
                    return Err(LogError::Contention { attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
