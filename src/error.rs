//! Boundary error taxonomy.
//!
//! Every failure kind gets its own business code so clients can tell a stale
//! edit (refresh and retry) from a bad name (fix and resubmit) from a broken
//! server (retry later).

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::apply::ApplyError;
use crate::store::{CodecError, NameError, StoreError};

/// Numeric status carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i64)]
pub enum BizCode {
    Success = 0,
    NotFound = 1,
    AlreadyExists = 2,
    InvalidName = 3,
    MalformedEncoding = 4,
    Conflict = 5,
    StorageError = 6,
    AlreadyApplying = 7,
    Timeout = 8,
    ApplyFailed = 9,
    BadRequest = 10,
}

impl BizCode {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(code: i64) -> Option<Self> {
        let code = match code {
            0 => BizCode::Success,
            1 => BizCode::NotFound,
            2 => BizCode::AlreadyExists,
            3 => BizCode::InvalidName,
            4 => BizCode::MalformedEncoding,
            5 => BizCode::Conflict,
            6 => BizCode::StorageError,
            7 => BizCode::AlreadyApplying,
            8 => BizCode::Timeout,
            9 => BizCode::ApplyFailed,
            10 => BizCode::BadRequest,
            _ => return None,
        };
        Some(code)
    }
}

/// Errors surfaced by the boundary operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config '{0}' not found")]
    NotFound(String),

    #[error("config '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid config name '{name}': {reason}")]
    InvalidName { name: String, reason: NameError },

    #[error("invalid {field}: {source}")]
    MalformedEncoding {
        field: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("apply is already in progress, please try later")]
    AlreadyApplying,

    #[error("reload did not finish within {0:?}; its effect is unknown")]
    Timeout(Duration),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ServiceError {
    pub fn biz_code(&self) -> BizCode {
        match self {
            ServiceError::NotFound(_) => BizCode::NotFound,
            ServiceError::AlreadyExists(_) => BizCode::AlreadyExists,
            ServiceError::InvalidName { .. } => BizCode::InvalidName,
            ServiceError::MalformedEncoding { .. } => BizCode::MalformedEncoding,
            ServiceError::Storage { .. } => BizCode::StorageError,
            ServiceError::AlreadyApplying => BizCode::AlreadyApplying,
            ServiceError::Timeout(_) => BizCode::Timeout,
            ServiceError::BadRequest(_) => BizCode::BadRequest,
        }
    }

    pub(crate) fn malformed(field: &'static str) -> impl FnOnce(CodecError) -> ServiceError {
        move |source| ServiceError::MalformedEncoding { field, source }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => ServiceError::NotFound(name),
            StoreError::AlreadyExists(name) => ServiceError::AlreadyExists(name),
            StoreError::InvalidName { name, reason } => ServiceError::InvalidName { name, reason },
            StoreError::Io { path, source } => ServiceError::Storage { path, source },
        }
    }
}

impl From<ApplyError> for ServiceError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::AlreadyApplying => ServiceError::AlreadyApplying,
            ApplyError::Timeout(limit) => ServiceError::Timeout(limit),
        }
    }
}
