//! Apply controller.
//!
//! # States
//! ```text
//! Idle ──apply──▶ Applying ──reload ok──────▶ Idle (Succeeded)
//!                    │──reload failed───────▶ Idle (Failed)
//!                    └──timeout─────────────▶ Idle (Indeterminate, Timeout error)
//! ```
//!
//! # Design Decisions
//! - Single flight: a request arriving while another apply runs is rejected
//!   with `AlreadyApplying`, never queued
//! - The reload runs in its own task, so a caller going away does not abort
//!   a reload half way
//! - The repository revision captured when a reload starts becomes the
//!   "active" revision once it succeeds; anything newer is pending

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::apply::command::ReloadCommand;
use crate::observability::metrics;
use crate::store::ConfigRepository;

/// Apply requests that could not produce an outcome.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("apply is already in progress, please try later")]
    AlreadyApplying,

    /// The reload may or may not have taken effect.
    #[error("reload did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyState {
    Idle,
    Applying,
}

/// Outcome of a completed reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Succeeded,
    Failed { reason: String },
}

/// What the last finished apply ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyResultKind {
    Succeeded,
    Failed,
    Indeterminate,
}

impl ApplyResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyResultKind::Succeeded => "succeeded",
            ApplyResultKind::Failed => "failed",
            ApplyResultKind::Indeterminate => "indeterminate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRecord {
    pub result: ApplyResultKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Repository revision the reload was started against.
    pub revision: u64,
    pub finished_at: DateTime<Utc>,
}

/// Snapshot of the controller for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyStatus {
    pub state: ApplyState,
    pub last: Option<ApplyRecord>,
    pub active_revision: u64,
    pub current_revision: u64,
    pub pending_changes: bool,
}

#[derive(Default)]
struct History {
    last: Option<ApplyRecord>,
    /// Revision 0 is whatever was on disk at startup.
    active_revision: u64,
}

/// Serializes reloads and tracks which revision is live.
pub struct ApplyController {
    command: Arc<dyn ReloadCommand>,
    repository: Arc<ConfigRepository>,
    timeout: Duration,
    gate: tokio::sync::Mutex<()>,
    applying: AtomicBool,
    history: Mutex<History>,
}

impl ApplyController {
    pub fn new(
        command: Arc<dyn ReloadCommand>,
        repository: Arc<ConfigRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            command,
            repository,
            timeout,
            gate: tokio::sync::Mutex::new(()),
            applying: AtomicBool::new(false),
            history: Mutex::new(History::default()),
        }
    }

    pub fn state(&self) -> ApplyState {
        if self.applying.load(Ordering::Acquire) {
            ApplyState::Applying
        } else {
            ApplyState::Idle
        }
    }

    pub fn status(&self) -> ApplyStatus {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let current_revision = self.repository.revision();
        ApplyStatus {
            state: self.state(),
            last: history.last.clone(),
            active_revision: history.active_revision,
            current_revision,
            pending_changes: current_revision != history.active_revision,
        }
    }

    /// Run the reload once and wait for its outcome.
    pub async fn apply(self: &Arc<Self>) -> Result<ApplyOutcome, ApplyError> {
        let this = Arc::clone(self);
        match tokio::spawn(async move { this.run().await }).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Apply task aborted");
                Ok(ApplyOutcome::Failed {
                    reason: format!("apply task aborted: {e}"),
                })
            }
        }
    }

    async fn run(&self) -> Result<ApplyOutcome, ApplyError> {
        let Ok(_permit) = self.gate.try_lock() else {
            tracing::warn!("Apply requested while another apply is running");
            metrics::record_apply("rejected", Duration::ZERO);
            return Err(ApplyError::AlreadyApplying);
        };

        self.applying.store(true, Ordering::Release);
        let revision = self.repository.revision();
        let started = Instant::now();
        tracing::info!(
            command = %self.command.describe(),
            revision,
            timeout = ?self.timeout,
            "Apply started"
        );

        let reloaded = tokio::time::timeout(self.timeout, self.command.reload()).await;
        let elapsed = started.elapsed();

        let (kind, reason, result) = match reloaded {
            Ok(Ok(output)) => {
                tracing::info!(revision, elapsed = ?elapsed, "Apply succeeded");
                tracing::debug!(output = %output, "Reload output");
                (ApplyResultKind::Succeeded, None, Ok(ApplyOutcome::Succeeded))
            }
            Ok(Err(e)) => {
                let reason = e.to_string();
                tracing::error!(revision, error = %reason, "Apply failed");
                (
                    ApplyResultKind::Failed,
                    Some(reason.clone()),
                    Ok(ApplyOutcome::Failed { reason }),
                )
            }
            Err(_) => {
                tracing::error!(revision, timeout = ?self.timeout, "Apply timed out, outcome unknown");
                let err = ApplyError::Timeout(self.timeout);
                (ApplyResultKind::Indeterminate, Some(err.to_string()), Err(err))
            }
        };

        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if kind == ApplyResultKind::Succeeded {
                history.active_revision = revision;
            }
            history.last = Some(ApplyRecord {
                result: kind,
                reason,
                revision,
                finished_at: Utc::now(),
            });
        }
        self.applying.store(false, Ordering::Release);
        metrics::record_apply(kind.as_str(), elapsed);

        result
    }
}
