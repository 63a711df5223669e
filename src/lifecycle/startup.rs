//! Startup orchestration.
//!
//! Builds the service from a validated config: repository first (fails if
//! the directory is unusable), then the reload command.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::apply::{ReloadError, ShellReloadCommand};
use crate::config::ServiceConfig;
use crate::service::ConfigService;
use crate::store::{ConfigRepository, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot open config directory: {0}")]
    Store(#[from] StoreError),

    #[error("invalid reload command: {0}")]
    Reload(#[from] ReloadError),
}

pub async fn build_service(config: &ServiceConfig) -> Result<ConfigService, StartupError> {
    let repository = Arc::new(ConfigRepository::from_config(&config.store).await?);
    let command = ShellReloadCommand::from_config(&config.apply)?;

    tracing::info!(
        root = %repository.root().display(),
        command = ?config.apply.command,
        apply_timeout_secs = config.apply.timeout_secs,
        "Service initialized"
    );

    Ok(ConfigService::new(
        repository,
        Arc::new(command),
        Duration::from_secs(config.apply.timeout_secs),
    ))
}
