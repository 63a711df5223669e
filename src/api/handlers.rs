use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    Json,
};
use serde::Serialize;

use crate::apply::{ApplyOutcome, ApplyStatus};
use crate::error::{BizCode, ServiceError};
use crate::http::request::{CreateConfigRequest, UpdateConfigRequest};
use crate::http::response::ApiResponse;
use crate::service::ConfigService;
use crate::store::ConfigEntry;
use crate::update::UpdateOutcome;

#[derive(Serialize)]
pub struct SystemStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct UpdateResult {
    pub outcome: UpdateOutcome,
}

pub async fn get_status() -> ApiResponse<SystemStatus> {
    ApiResponse::success(SystemStatus {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn list_confs(
    State(service): State<ConfigService>,
) -> Result<ApiResponse<Vec<ConfigEntry>>, ServiceError> {
    Ok(ApiResponse::success(service.list_entries().await?))
}

/// `GET /conf?name=a.conf&name=b.conf`
pub async fn get_conf(
    State(service): State<ConfigService>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<BTreeMap<String, String>>, ServiceError> {
    let query = query.unwrap_or_default();
    let names: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "name")
        .map(|(_, value)| value.into_owned())
        .collect();

    Ok(ApiResponse::success(service.get_content(&names).await?))
}

pub async fn create_conf(
    State(service): State<ConfigService>,
    payload: Result<Json<CreateConfigRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, ServiceError> {
    let Json(req) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    service.create_entry(&req.name, &req.content).await?;
    Ok(ApiResponse::ok())
}

pub async fn update_conf(
    State(service): State<ConfigService>,
    payload: Result<Json<UpdateConfigRequest>, JsonRejection>,
) -> Result<ApiResponse<UpdateResult>, ServiceError> {
    let Json(req) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let outcome = service
        .update_entry(&req.name, &req.current_content, &req.expected_content)
        .await?;

    let result = UpdateResult { outcome };
    Ok(match outcome {
        UpdateOutcome::Applied => ApiResponse::success(result),
        UpdateOutcome::Conflict => {
            ApiResponse::fail(BizCode::Conflict, "config content has been modified").with_data(result)
        }
    })
}

pub async fn apply_changes(
    State(service): State<ConfigService>,
) -> Result<ApiResponse<ApplyOutcome>, ServiceError> {
    let outcome = service.apply_changes().await?;
    Ok(match outcome {
        ApplyOutcome::Succeeded => ApiResponse::success(outcome),
        ApplyOutcome::Failed { ref reason } => {
            let message = format!("apply failed: {reason}");
            ApiResponse::fail(BizCode::ApplyFailed, message).with_data(outcome.clone())
        }
    })
}

pub async fn apply_status(State(service): State<ConfigService>) -> ApiResponse<ApplyStatus> {
    ApiResponse::success(service.apply_status())
}
