//! Entry metadata and content types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata for one managed file.
///
/// `size` and `modified_at` are advisory; only the bytes are authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub name: String,
    pub size: u64,
    #[serde(rename = "modTime")]
    pub modified_at: DateTime<Utc>,
}

/// Owned content of one managed file.
///
/// Always handed out by value, so callers never alias repository storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigBlob {
    raw: Vec<u8>,
}

impl ConfigBlob {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl From<Vec<u8>> for ConfigBlob {
    fn from(raw: Vec<u8>) -> Self {
        Self { raw }
    }
}

impl From<&[u8]> for ConfigBlob {
    fn from(raw: &[u8]) -> Self {
        Self { raw: raw.to_vec() }
    }
}

impl From<&str> for ConfigBlob {
    fn from(raw: &str) -> Self {
        Self {
            raw: raw.as_bytes().to_vec(),
        }
    }
}
