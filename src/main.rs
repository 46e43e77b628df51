//! ghm - GitHub multi-repo helper
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use ghm::cli::{Cli, Commands};
use ghm::config::ConfigManager;
use ghm::error::{GhmError, GhmResult};
use ghm::gh::GhRunner;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GhmResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug; GHM_LOG overrides
    let filter = EnvFilter::try_from_env("GHM_LOG").unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("ghm=warn"),
        1 => EnvFilter::new("ghm=info"),
        _ => EnvFilter::new("ghm=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;
    let cache_path = ConfigManager::cache_path(&config, cli.cache_file.as_deref());
    let repos_file = ConfigManager::repos_path(&config, cli.repos_file.as_deref());
    debug!("Using cache file {}", cache_path.display());

    // Commands that do not talk to gh
    let command = match cli.command {
        Commands::Repos => return ghm::cli::commands::repos(&repos_file).await,
        Commands::Cache(args) => return ghm::cli::commands::cache(args, &cache_path),
        Commands::Config(args) => {
            return ghm::cli::commands::config(args, &config, &config_manager)
        }
        command => command,
    };

    let mut runner = GhRunner::from_config(&config, cache_path);

    let result = tokio::select! {
        result = dispatch(command, &mut runner, &repos_file) => result,
        _ = tokio::signal::ctrl_c() => Err(GhmError::Interrupted),
    };

    // The cache is written on every path; a write failure only surfaces
    // when the command itself succeeded
    match (result, runner.close()) {
        (Err(e), Err(store_err)) => {
            warn!("{}", store_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), stored) => stored,
    }
}

async fn dispatch(command: Commands, runner: &mut GhRunner, repos_file: &Path) -> GhmResult<()> {
    match command {
        Commands::Pr(cmd) => ghm::cli::commands::pr(cmd, runner, repos_file).await,
        Commands::Workflow(cmd) => ghm::cli::commands::workflow(cmd, runner).await,
        Commands::Action(cmd) => ghm::cli::commands::action(cmd, runner, repos_file).await,
        Commands::Release(cmd) => ghm::cli::commands::release(cmd, runner, repos_file).await,
        Commands::Repos | Commands::Cache(_) | Commands::Config(_) => {
            unreachable!("handled before gh setup")
        }
    }
}
