//! Repos command - show the managed repository list

use crate::config::load_repos;
use crate::error::GhmResult;
use console::style;
use std::path::Path;

/// Execute the repos command
pub async fn execute(repos_file: &Path) -> GhmResult<()> {
    let repos = load_repos(repos_file).await?;

    println!(
        "Repos configured in [{}]",
        style(repos_file.display()).cyan()
    );
    for repo in repos {
        println!("\t{}", repo);
    }
    Ok(())
}
