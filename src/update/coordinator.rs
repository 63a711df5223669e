//! Optimistic update coordinator.
//!
//! A client proves it edited the latest content by echoing back the bytes it
//! started from. The coordinator holds no state of its own; all
//! serialization lives in `ConfigRepository::compare_and_write`, so it can be
//! shared freely between request handlers.

use std::sync::Arc;

use serde::Serialize;

use crate::observability::metrics;
use crate::store::{ConfigBlob, ConfigRepository, StoreError};

/// A proposed edit of one config file.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub name: String,
    /// Bytes the client believes are on disk.
    pub claimed_current: ConfigBlob,
    /// Bytes to write.
    pub desired_new: ConfigBlob,
}

/// Result of an update attempt.
///
/// `Conflict` is an ordinary outcome: the stored bytes moved on since the
/// client read them and nothing was written. Merging is up to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    Conflict,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOutcome::Applied => "applied",
            UpdateOutcome::Conflict => "conflict",
        }
    }
}

/// Compare-and-swap front end for config edits.
#[derive(Clone)]
pub struct UpdateCoordinator {
    repository: Arc<ConfigRepository>,
}

impl UpdateCoordinator {
    pub fn new(repository: Arc<ConfigRepository>) -> Self {
        Self { repository }
    }

    /// Apply `request` if its claimed content still matches storage.
    ///
    /// A missing entry surfaces as `StoreError::NotFound`.
    pub async fn update(&self, request: UpdateRequest) -> Result<UpdateOutcome, StoreError> {
        let UpdateRequest {
            name,
            claimed_current,
            desired_new,
        } = request;

        let written = self
            .repository
            .compare_and_write(&name, claimed_current.as_bytes(), desired_new)
            .await?;

        let outcome = if written {
            UpdateOutcome::Applied
        } else {
            UpdateOutcome::Conflict
        };

        match outcome {
            UpdateOutcome::Applied => tracing::info!(name = %name, "Update applied"),
            UpdateOutcome::Conflict => {
                tracing::warn!(name = %name, "Update rejected: stored content has changed")
            }
        }
        metrics::record_update(outcome.as_str());
        Ok(outcome)
    }
}
