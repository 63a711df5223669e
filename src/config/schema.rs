//! Configuration schema definitions.
//!
//! All sections have defaults so an empty file (or no file) is a valid
//! configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the config service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener.
    pub listener: ListenerConfig,

    /// Managed config directory.
    pub store: StoreConfig,

    /// External reload command.
    pub apply: ApplyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8786").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8786".to_string(),
        }
    }
}

/// Managed directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the managed files.
    pub root: PathBuf,

    /// Suffix every managed file name must end with.
    pub suffix: String,

    /// Create `root` on startup if it does not exist.
    pub create_root: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./conf.d"),
            suffix: ".conf".to_string(),
            create_root: true,
        }
    }
}

/// Reload command configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Program followed by its arguments.
    pub command: Vec<String>,

    /// Upper bound on a single reload in seconds.
    pub timeout_secs: u64,

    /// Text the command output must contain to count as success.
    pub success_marker: Option<String>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "docker".to_string(),
                "restart".to_string(),
                "gateway".to_string(),
            ],
            timeout_secs: 60,
            success_marker: Some("gateway".to_string()),
        }
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must exceed `apply.timeout_secs`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Request hardening.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
