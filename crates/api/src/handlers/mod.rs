pub mod cache;
pub mod correlations;
pub mod notify;
pub mod ping;
