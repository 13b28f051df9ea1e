//! Outbound client for the service desk.
//!
//! [`DeskClient`] is the seam the correlation engine depends on; [`SdpClient`]
//! implements it against the ServiceDesk Plus REST API.

pub mod client;
pub mod error;
pub mod models;

pub use client::{DeskClient, SdpClient, SdpConfig};
pub use error::{DeskError, DeskErrorKind};
pub use models::CreatedRequest;
