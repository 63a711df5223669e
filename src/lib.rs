//! Gateway config service library.
//!
//! Manages a directory of server config files: list, read, create,
//! compare-and-write updates, and an apply action that runs the external
//! reload command.

pub mod api;
pub mod apply;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod query;
pub mod service;
pub mod store;
pub mod update;

pub use config::schema::ServiceConfig;
pub use error::{BizCode, ServiceError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::ConfigService;
