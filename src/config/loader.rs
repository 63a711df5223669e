//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_BIND_ADDRESS: &str = "GATEWAY_CONF_BIND_ADDRESS";
pub const ENV_ROOT: &str = "GATEWAY_CONF_ROOT";
pub const ENV_LOG_LEVEL: &str = "GATEWAY_CONF_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => ServiceConfig::default(),
    };
    finish(config, |key| std::env::var(key).ok())
}

fn parse_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn finish(
    mut config: ServiceConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig, ConfigError> {
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay the few settings that deployments usually set per host.
pub fn apply_env_overrides(config: &mut ServiceConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(addr) = env(ENV_BIND_ADDRESS).filter(|v| !v.is_empty()) {
        config.listener.bind_address = addr;
    }
    if let Some(root) = env(ENV_ROOT).filter(|v| !v.is_empty()) {
        config.store.root = PathBuf::from(root);
    }
    if let Some(level) = env(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
        config.observability.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[store]
root = "/etc/gateway/conf.d"

[apply]
command = ["systemctl", "reload", "nginx"]
success_marker = ""
timeout_secs = 10
"#
        )
        .unwrap();

        let config = parse_file(file.path()).unwrap();
        assert_eq!(config.store.root, PathBuf::from("/etc/gateway/conf.d"));
        assert_eq!(config.store.suffix, ".conf");
        assert_eq!(config.apply.command, ["systemctl", "reload", "nginx"]);
        assert_eq!(config.apply.timeout_secs, 10);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8786");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BIND_ADDRESS, "127.0.0.1:9999"),
            (ENV_ROOT, "/srv/conf"),
            (ENV_LOG_LEVEL, ""),
        ]
        .into_iter()
        .collect();

        let config = finish(ServiceConfig::default(), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.store.root, PathBuf::from("/srv/conf"));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[apply]\ncommand = []").unwrap();

        let err = parse_file(file.path())
            .and_then(|c| finish(c, |_| None))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::EmptyCommand]));
    }

    #[test]
    fn test_syntax_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nroot = 1").unwrap();
        assert!(matches!(parse_file(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/gateway-conf.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
