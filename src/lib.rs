//! ghm - GitHub multi-repo helper
//!
//! Runs gh lookups through a persistent read-through cache that is purged
//! whenever a mutating command succeeds.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gh;

pub use error::{GhmError, GhmResult};
