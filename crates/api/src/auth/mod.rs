//! Authentication primitives.
//!
//! - [`token`] -- Argon2id hashing and verification of the shared API token.

pub mod token;
