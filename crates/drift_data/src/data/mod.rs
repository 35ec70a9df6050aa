//! Core data structures for the DRIFT benchmark.

pub mod link;
pub mod metrics;
pub mod state;
pub mod terrain;
