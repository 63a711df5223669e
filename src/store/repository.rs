//! Directory-backed config repository.
//!
//! # Responsibilities
//! - Enumerate managed files (sorted by name)
//! - Read, create and conditionally replace individual files
//! - Enforce the naming policy before any path is touched
//!
//! # Design Decisions
//! - Writes are staged into a hidden temp file, fsynced, then moved into
//!   place (`hard_link` for create, `rename` for replace); readers never see
//!   a partial file
//! - Per-name async mutexes serialize create / compare-and-write on the same
//!   name; reads take no lock. A name's mutex is evicted once its last holder
//!   releases it, so the lock map only tracks names with writes in flight
//! - I/O errors are surfaced as `StoreError::Io`, never retried here

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::store::naming::{NameError, NamePolicy};
use crate::store::types::{ConfigBlob, ConfigEntry};

/// Errors raised by repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config '{0}' not found")]
    NotFound(String),

    #[error("config '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid config name '{name}': {reason}")]
    InvalidName {
        name: String,
        #[source]
        reason: NameError,
    },

    #[error("storage error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn storage(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Owner of the managed config directory.
pub struct ConfigRepository {
    root: PathBuf,
    policy: NamePolicy,
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// Bumped after every successful create or replace.
    revision: AtomicU64,
}

impl ConfigRepository {
    /// Open a repository rooted at an existing directory.
    pub async fn open(root: impl Into<PathBuf>, policy: NamePolicy) -> Result<Self, StoreError> {
        let root = root.into();
        let meta = fs::metadata(&root).await.map_err(|e| storage(&root, e))?;
        if !meta.is_dir() {
            return Err(storage(
                &root,
                std::io::Error::new(ErrorKind::InvalidInput, "config root is not a directory"),
            ));
        }

        tracing::info!(root = %root.display(), suffix = %policy.suffix(), "Config repository opened");
        Ok(Self {
            root,
            policy,
            locks: DashMap::new(),
            revision: AtomicU64::new(0),
        })
    }

    /// Open the repository described by the store config, creating the root if asked to.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.create_root {
            fs::create_dir_all(&config.root)
                .await
                .map_err(|e| storage(&config.root, e))?;
        }
        Self::open(&config.root, NamePolicy::new(config.suffix.clone())).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// Current in-memory revision; increases with every successful write.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Snapshot of all managed entries, ordered by name.
    pub async fn list(&self) -> Result<Vec<ConfigEntry>, StoreError> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| storage(&self.root, e))?;

        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await.map_err(|e| storage(&self.root, e))? {
            let Ok(name) = item.file_name().into_string() else {
                continue;
            };
            if !self.policy.is_valid(&name) {
                continue;
            }

            let meta = match item.metadata().await {
                Ok(meta) => meta,
                // Raced with an external delete.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(storage(&item.path(), e)),
            };
            if !meta.is_file() {
                continue;
            }

            let modified = meta.modified().map_err(|e| storage(&item.path(), e))?;
            entries.push(ConfigEntry {
                name,
                size: meta.len(),
                modified_at: DateTime::<Utc>::from(modified),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Read a copy of the stored bytes for `name`.
    pub async fn read(&self, name: &str) -> Result<ConfigBlob, StoreError> {
        // An invalid name can never have been stored.
        if !self.policy.is_valid(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.read_path(name, &self.root.join(name)).await
    }

    /// Create `name` with `blob`; fails if it already exists.
    pub async fn create(&self, name: &str, blob: ConfigBlob) -> Result<(), StoreError> {
        self.policy
            .check(name)
            .map_err(|reason| StoreError::InvalidName {
                name: name.to_string(),
                reason,
            })?;

        let _guard = self.lock_name(name).await;

        let target = self.root.join(name);
        let staged = self.stage(blob.as_bytes()).await?;

        // hard_link refuses to clobber, so an existing file (even one created
        // behind our back) is never overwritten.
        let linked = fs::hard_link(&staged, &target).await;
        self.discard(&staged).await;

        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(name.to_string()));
            }
            Err(e) => return Err(storage(&target, e)),
        }

        self.sync_root().await;
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(name = %name, size = blob.len(), revision, "Config created");
        Ok(())
    }

    /// Replace the stored bytes for `name` with `new` only if they currently
    /// equal `expected`. Returns whether the write happened.
    pub async fn compare_and_write(
        &self,
        name: &str,
        expected: &[u8],
        new: ConfigBlob,
    ) -> Result<bool, StoreError> {
        if !self.policy.is_valid(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let _guard = self.lock_name(name).await;

        let target = self.root.join(name);
        let current = self.read_path(name, &target).await?;
        if current.as_bytes() != expected {
            tracing::debug!(name = %name, "Compare-and-write mismatch");
            return Ok(false);
        }

        let staged = self.stage(new.as_bytes()).await?;
        if let Err(e) = self.swap_into_place(&staged, &target).await {
            self.discard(&staged).await;
            return Err(e);
        }

        self.sync_root().await;
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(name = %name, size = new.len(), revision, "Config replaced");
        Ok(true)
    }

    async fn lock_name(&self, name: &str) -> NameGuard<'_> {
        let mut held = NameGuard {
            locks: &self.locks,
            name: name.to_string(),
            guard: None,
        };
        let lock = self.locks.entry(name.to_string()).or_default().clone();
        held.guard = Some(lock.lock_owned().await);
        held
    }

    async fn read_path(&self, name: &str, path: &Path) -> Result<ConfigBlob, StoreError> {
        match fs::read(path).await {
            Ok(raw) => Ok(ConfigBlob::new(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_string())),
            Err(e) => Err(storage(path, e)),
        }
    }

    /// Write `raw` to a fresh hidden file in the root and fsync it.
    async fn stage(&self, raw: &[u8]) -> Result<PathBuf, StoreError> {
        let staged = self.root.join(format!(".staging-{}.tmp", Uuid::new_v4().simple()));

        let written: std::io::Result<()> = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&staged)
                .await?;
            file.write_all(raw).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            self.discard(&staged).await;
            return Err(storage(&staged, e));
        }
        Ok(staged)
    }

    async fn swap_into_place(&self, staged: &Path, target: &Path) -> Result<(), StoreError> {
        // Keep the mode of the file being replaced.
        if let Ok(meta) = fs::metadata(target).await {
            fs::set_permissions(staged, meta.permissions())
                .await
                .map_err(|e| storage(staged, e))?;
        }
        fs::rename(staged, target).await.map_err(|e| storage(target, e))
    }

    async fn discard(&self, staged: &Path) {
        if let Err(e) = fs::remove_file(staged).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staging file");
            }
        }
    }

    /// Flush the directory entry after a link/rename. The data itself is
    /// already in place at this point, so failures are only logged.
    #[cfg(unix)]
    async fn sync_root(&self) {
        let synced: std::io::Result<()> =
            async { fs::File::open(&self.root).await?.sync_all().await }.await;
        if let Err(e) = synced {
            tracing::warn!(root = %self.root.display(), error = %e, "Failed to sync config directory");
        }
    }

    #[cfg(not(unix))]
    async fn sync_root(&self) {}
}

/// Exclusive hold on one name; evicts the name's mutex when nobody else
/// holds or waits on it.
struct NameGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NameGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.name, |_, lock| Arc::strong_count(lock) == 1);
    }
}
