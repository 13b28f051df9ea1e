//! Row models and insert DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching a
//! database row and, where the core writes that table, a create DTO.

pub mod desk_request;
pub mod link;
pub mod problem;
