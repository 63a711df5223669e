//! Naming policy for managed config files.
//!
//! A name maps directly onto a path inside the managed directory, so the
//! policy is what keeps every operation confined to that directory:
//! - non-empty, at most 255 bytes
//! - no `/`, `\` or NUL
//! - not `.` / `..`, and no leading dot (reserved for staging files)
//! - ends with the configured suffix and has a non-empty stem

use thiserror::Error;

/// Longest file name most filesystems accept.
pub const MAX_NAME_LEN: usize = 255;

/// Reasons a name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,

    #[error("name exceeds {MAX_NAME_LEN} bytes")]
    TooLong,

    #[error("name contains a path separator or NUL byte")]
    IllegalCharacter,

    #[error("name must not start with '.'")]
    Hidden,

    #[error("name must end with '{0}'")]
    MissingSuffix(String),
}

/// Validates names against a required suffix.
#[derive(Debug, Clone)]
pub struct NamePolicy {
    suffix: String,
}

impl NamePolicy {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Check `name` against the policy.
    pub fn check(&self, name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong);
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(NameError::IllegalCharacter);
        }
        // Also covers "." and "..".
        if name.starts_with('.') {
            return Err(NameError::Hidden);
        }
        match name.strip_suffix(self.suffix.as_str()) {
            Some(stem) if !stem.is_empty() => Ok(()),
            _ => Err(NameError::MissingSuffix(self.suffix.clone())),
        }
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.check(name).is_ok()
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::new(".conf")
    }
}
