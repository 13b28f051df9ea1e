//! Request extractors guarding the API.
//!
//! - [`auth::ApiToken`] -- Requires a valid bearer token.

pub mod auth;
