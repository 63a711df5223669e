//! Read-side queries.

pub mod facade;

pub use facade::ConfigQuery;
