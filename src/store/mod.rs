//! Config storage subsystem.
//!
//! # Data Flow
//! ```text
//! transport text (base64)
//!     → codec.rs (decode at the boundary)
//!     → naming.rs (name policy, path confinement)
//!     → repository.rs (list / read / create / compare-and-write)
//!     → managed directory on disk
//! ```
//!
//! # Design Decisions
//! - The repository is the only durable owner of config bytes
//! - Callers always receive owned copies (`ConfigBlob`)
//! - Atomicity comes from staged files plus per-name locks

pub mod codec;
pub mod naming;
pub mod repository;
pub mod types;

pub use codec::CodecError;
pub use naming::{NameError, NamePolicy};
pub use repository::{ConfigRepository, StoreError};
pub use types::{ConfigBlob, ConfigEntry};
