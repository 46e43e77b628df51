//! Command-line interface

pub mod args;
pub mod commands;
mod output;
mod prompt;

pub use args::{Cli, Commands};
