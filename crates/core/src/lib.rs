//! Shared domain types for the monitor-to-service-desk bridge.
//!
//! - [`problem`] -- the normalized problem event handed to the correlation engine.
//! - [`monitor`] -- inbound monitor notification payloads and their conversion.
//! - [`ticket`] -- building desk ticket drafts from problem events.

pub mod error;
pub mod monitor;
pub mod problem;
pub mod ticket;
pub mod types;
