//! Uniform response envelope.
//!
//! Every body is `{biz_code, message, data?}`. `biz_code` 0 means success;
//! anything else names the failure category. The HTTP status mirrors the
//! category so plain HTTP clients can still branch on it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{BizCode, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub biz_code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            biz_code: BizCode::Success.as_i64(),
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn fail(code: BizCode, message: impl Into<String>) -> Self {
        Self {
            biz_code: code.as_i64(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.biz_code == BizCode::Success.as_i64()
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            biz_code: BizCode::Success.as_i64(),
            message: String::new(),
            data: None,
        }
    }
}

/// HTTP status matching a business code.
pub fn http_status(code: BizCode) -> StatusCode {
    match code {
        BizCode::Success => StatusCode::OK,
        BizCode::NotFound => StatusCode::NOT_FOUND,
        BizCode::AlreadyExists | BizCode::Conflict | BizCode::AlreadyApplying => {
            StatusCode::CONFLICT
        }
        BizCode::InvalidName | BizCode::MalformedEncoding | BizCode::BadRequest => {
            StatusCode::BAD_REQUEST
        }
        BizCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        BizCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        BizCode::ApplyFailed => StatusCode::BAD_GATEWAY,
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = BizCode::from_i64(self.biz_code)
            .map(http_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let code = self.biz_code();
        match code {
            BizCode::StorageError => tracing::error!(error = %self, "Storage failure"),
            _ => tracing::debug!(error = %self, "Request failed"),
        }
        ApiResponse::<()>::fail(code, self.to_string()).into_response()
    }
}
