//! Boundary operations.
//!
//! Takes and returns transport-encoded payloads, decodes them once, and
//! routes each call to the read side, the update coordinator or the apply
//! controller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::apply::{ApplyController, ApplyOutcome, ApplyStatus, ReloadCommand};
use crate::error::ServiceError;
use crate::observability::metrics;
use crate::query::ConfigQuery;
use crate::store::{codec, ConfigEntry, ConfigRepository, StoreError};
use crate::update::{UpdateCoordinator, UpdateOutcome, UpdateRequest};

#[derive(Clone)]
pub struct ConfigService {
    repository: Arc<ConfigRepository>,
    query: ConfigQuery,
    coordinator: UpdateCoordinator,
    controller: Arc<ApplyController>,
}

impl ConfigService {
    pub fn new(
        repository: Arc<ConfigRepository>,
        command: Arc<dyn ReloadCommand>,
        apply_timeout: Duration,
    ) -> Self {
        Self {
            query: ConfigQuery::new(repository.clone()),
            coordinator: UpdateCoordinator::new(repository.clone()),
            controller: Arc::new(ApplyController::new(
                command,
                repository.clone(),
                apply_timeout,
            )),
            repository,
        }
    }

    pub async fn list_entries(&self) -> Result<Vec<ConfigEntry>, ServiceError> {
        Ok(self.query.list_entries().await?)
    }

    pub async fn get_content(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, String>, ServiceError> {
        if names.is_empty() {
            return Err(ServiceError::BadRequest("at least one name is required".into()));
        }
        Ok(self.query.get_content(names).await?)
    }

    pub async fn create_entry(&self, name: &str, content: &str) -> Result<(), ServiceError> {
        self.repository
            .policy()
            .check(name)
            .map_err(|reason| ServiceError::InvalidName {
                name: name.to_string(),
                reason,
            })?;
        let raw = codec::decode(content).map_err(ServiceError::malformed("content"))?;

        let created = self.repository.create(name, raw.into()).await;
        metrics::record_create(match &created {
            Ok(()) => "created",
            Err(StoreError::AlreadyExists(_)) => "exists",
            Err(_) => "error",
        });
        Ok(created?)
    }

    pub async fn update_entry(
        &self,
        name: &str,
        current_content: &str,
        expected_content: &str,
    ) -> Result<UpdateOutcome, ServiceError> {
        let claimed_current =
            codec::decode(current_content).map_err(ServiceError::malformed("current content"))?;
        let desired_new =
            codec::decode(expected_content).map_err(ServiceError::malformed("expected content"))?;

        let request = UpdateRequest {
            name: name.to_string(),
            claimed_current: claimed_current.into(),
            desired_new: desired_new.into(),
        };
        Ok(self.coordinator.update(request).await?)
    }

    pub async fn apply_changes(&self) -> Result<ApplyOutcome, ServiceError> {
        Ok(self.controller.apply().await?)
    }

    pub fn apply_status(&self) -> ApplyStatus {
        self.controller.status()
    }
}
