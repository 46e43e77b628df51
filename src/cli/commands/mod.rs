//! CLI command implementations

pub mod action;
pub mod cache;
pub mod config;
pub mod pr;
pub mod release;
pub mod repos;
pub mod workflow;

pub use action::execute as action;
pub use cache::execute as cache;
pub use config::execute as config;
pub use pr::execute as pr;
pub use release::execute as release;
pub use repos::execute as repos;
pub use workflow::execute as workflow;

use crate::cli::args::RepoSelection;
use crate::config::{load_repos, select_repos};
use crate::error::GhmResult;
use std::path::Path;

/// Configured repositories picked by `--repo` / `--repo-filter`
async fn selected_repos(selection: &RepoSelection, repos_file: &Path) -> GhmResult<Vec<String>> {
    let repos = load_repos(repos_file).await?;
    let selected = select_repos(
        &repos,
        selection.repo.as_deref(),
        selection.repo_filter.as_deref(),
    )?;

    if selected.is_empty() {
        println!("No configured repositories match.");
    }
    Ok(selected)
}
