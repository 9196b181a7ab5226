//! Client for the hosted JSON document store.
//!
//! The logbook is one bin in a jsonbin-style API: reads GET the latest
//! version of the bin, writes PUT the whole document back. Requests carry
//! the bin's master key header, and reads ask intermediaries not to serve
//! a cached copy.

use serde::Deserialize;

use super::{DocumentStore, Revision, Snapshot, StoreError};
use crate::models::Logbook;
use async_trait::async_trait;

/// Read envelope returned by the bin API.
///
/// A bin created empty may hold `null`, which reads as an empty logbook.
#[derive(Debug, Deserialize)]
struct ReadEnvelope {
    #[serde(default)]
    record: Option<Logbook>,
}

/// Remote JSON-bin backed store.
///
/// The bin API has no conditional PUT, so `put` re-reads the bin and
/// compares revisions immediately before writing. A writer racing past
/// that check can still win; callers retry on [`StoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
    bin_id: Option<String>,
    master_key: Option<String>,
    client: reqwest::Client,
}

impl RemoteStore {
    /// Creates a store client.
    ///
    /// A missing bin id or master key is allowed; every operation then
    /// fails with [`StoreError::NotConfigured`].
    pub fn new(
        base_url: impl Into<String>,
        bin_id: Option<String>,
        master_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            bin_id,
            master_key,
            client: reqwest::Client::new(),
        }
    }

    /// Builds the read URL: `{base}/b/{bin}/latest`.
    fn read_url(&self, bin_id: &str) -> String {
        format!("{}/b/{}/latest", self.base_url.trim_end_matches('/'), bin_id)
    }

    /// Builds the write URL: `{base}/b/{bin}`.
    fn write_url(&self, bin_id: &str) -> String {
        format!("{}/b/{}", self.base_url.trim_end_matches('/'), bin_id)
    }

    fn credentials(&self) -> Result<(&str, &str), StoreError> {
        match (self.bin_id.as_deref(), self.master_key.as_deref()) {
            (Some(bin_id), Some(key)) => Ok((bin_id, key)),
            _ => Err(StoreError::NotConfigured),
        }
    }

    async fn fetch_latest(&self) -> Result<Snapshot, StoreError> {
        let (bin_id, key) = self.credentials()?;

        let response = self
            .client
            .get(self.read_url(bin_id))
            .header("X-Master-Key", key)
            .header("Cache-Control", "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ReadStatus(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: ReadEnvelope =
            serde_json::from_slice(&body).map_err(StoreError::Decode)?;

        let logbook = envelope.record.unwrap_or_default();
        let revision = Revision::of(&logbook)?;

        Ok(Snapshot { logbook, revision })
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    async fn fetch(&self) -> Result<Snapshot, StoreError> {
        self.fetch_latest().await
    }

    async fn put(&self, logbook: &Logbook, expected: &Revision) -> Result<Revision, StoreError> {
        let (bin_id, key) = self.credentials()?;

        // Best-effort freshness check before the unconditional PUT.
        let current = self.fetch_latest().await?;
        if current.revision != *expected {
            return Err(StoreError::Conflict {
                expected: expected.clone(),
                actual: current.revision,
            });
        }

        let response = self
            .client
            .put(self.write_url(bin_id))
            .header("X-Master-Key", key)
            .json(logbook)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::WriteStatus(response.status().as_u16()));
        }

        Revision::of(logbook)
    }
}
