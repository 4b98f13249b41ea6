//! Bulk collection of Reddit submissions and comments from the Pushshift API.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
