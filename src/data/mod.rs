//! Pushshift retrieval, batching and CSV persistence.

pub mod batch;
pub mod harvest;
pub mod pushshift;
pub mod query;
pub mod store;
pub mod table;
