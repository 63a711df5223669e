//! HTTP transport.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, tracing, timeout, body limit)
//!     → api/ (route to handler, extract payload)
//!     → service (boundary operation)
//!     → response.rs (envelope + status)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{CreateConfigRequest, UpdateConfigRequest, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::HttpServer;
