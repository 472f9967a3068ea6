//! Incident crate: Betterstack Uptime incidents client and JSON export.
#![allow(clippy::uninlined_format_args)]
/// Betterstack API client
pub mod client;
/// Error types
pub mod error;
/// JSON export
pub mod export;
/// Incident resources
pub mod model;
/// Listing filters
pub mod query;
/// Retry policy for transient failures
pub mod retry;

pub use client::Client;
pub use error::{FetchError, RemoteError};
pub use export::write_incidents;
pub use model::{Incident, IncidentAttributes, IncidentPage, IncidentStatus, Pagination};
pub use query::IncidentQuery;
pub use retry::RetryPolicy;
