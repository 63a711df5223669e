//! External reload command.
//!
//! The controller treats the reload as an opaque all-or-nothing action. The
//! production implementation runs a configured program (by default
//! `docker restart gateway`) and checks its exit status and output.

use std::process::Stdio;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ApplyConfig;

/// Why a reload attempt failed.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("reload command is empty")]
    EmptyCommand,

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reload command exited with {status}: {output}")]
    Exit { status: String, output: String },

    #[error("reload output does not contain '{marker}'")]
    MissingMarker { marker: String, output: String },
}

/// Something that can make persisted config take effect.
///
/// On success it yields the command's combined output for logging.
pub trait ReloadCommand: Send + Sync {
    fn reload(&self) -> BoxFuture<'_, Result<String, ReloadError>>;

    /// Short label for logs.
    fn describe(&self) -> String {
        "reload".to_string()
    }
}

/// Runs a program and judges success from its exit status and output.
#[derive(Debug, Clone)]
pub struct ShellReloadCommand {
    program: String,
    args: Vec<String>,
    success_marker: Option<String>,
}

impl ShellReloadCommand {
    pub fn new(command: &[String], success_marker: Option<String>) -> Result<Self, ReloadError> {
        let (program, args) = command.split_first().ok_or(ReloadError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            success_marker: success_marker.filter(|m| !m.is_empty()),
        })
    }

    pub fn from_config(config: &ApplyConfig) -> Result<Self, ReloadError> {
        Self::new(&config.command, config.success_marker.clone())
    }
}

impl ReloadCommand for ShellReloadCommand {
    fn reload(&self) -> BoxFuture<'_, Result<String, ReloadError>> {
        Box::pin(async move {
            // kill_on_drop: a timed-out reload must not linger.
            let output = Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| ReloadError::Spawn {
                    program: self.program.clone(),
                    source,
                })?;

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            let combined = combined.trim().to_string();

            if !output.status.success() {
                return Err(ReloadError::Exit {
                    status: output.status.to_string(),
                    output: combined,
                });
            }

            if let Some(marker) = &self.success_marker {
                if !combined.contains(marker.as_str()) {
                    return Err(ReloadError::MissingMarker {
                        marker: marker.clone(),
                        output: combined,
                    });
                }
            }

            Ok(combined)
        })
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
