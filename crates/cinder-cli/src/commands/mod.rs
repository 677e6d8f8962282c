//! CLI command implementations.

pub mod config;
pub mod fill;
pub mod probe;
pub mod stat;
