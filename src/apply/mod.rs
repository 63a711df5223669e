//! Apply (commit + activate) subsystem.
//!
//! # Data Flow
//! ```text
//! ApplyChanges
//!     → controller.rs (single-flight gate, timeout, outcome history)
//!     → command.rs (external reload: spawn, exit status, success marker)
//! ```

pub mod command;
pub mod controller;

pub use command::{ReloadCommand, ReloadError, ShellReloadCommand};
pub use controller::{
    ApplyController, ApplyError, ApplyOutcome, ApplyRecord, ApplyResultKind, ApplyState,
    ApplyStatus,
};
