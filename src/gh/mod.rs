//! GitHub CLI integration

pub mod checks;
pub mod executor;
pub mod filter;
pub mod release;
pub mod runner;

pub use executor::{CommandExecutor, CommandOutput, GhCli};
pub use filter::{MergeState, PrQuery, ReviewDecision};
pub use release::{split_release_name, ReleaseSummary};
pub use runner::GhRunner;
