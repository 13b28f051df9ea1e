//! Problem-to-ticket correlation.
//!
//! - [`cache`] -- In-memory set of problem ids known to have a ticket.
//! - [`correlation`] -- The engine deciding whether a problem needs a ticket.

pub mod cache;
pub mod correlation;

pub use cache::ProblemCache;
pub use correlation::{CorrelationEngine, CorrelationError, CorrelationOutcome, DeskFailure};
