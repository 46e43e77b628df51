//! CLI argument definitions using clap derive

use crate::gh::PrQuery;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ghm - GitHub multi-repo helper with a persistent read-through cache
///
/// Runs common gh workflows, caching lookups between invocations.
#[derive(Parser, Debug)]
#[command(name = "ghm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GHM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache file path
    #[arg(long, global = true, env = "GHM_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Repository list path
    #[arg(long, global = true, env = "GHM_REPOS_FILE")]
    pub repos_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured repositories
    Repos,

    /// Work with pull requests
    #[command(subcommand)]
    Pr(PrCommand),

    /// Work with workflows of one repository
    #[command(subcommand)]
    Workflow(WorkflowCommand),

    /// Run and rerun Actions workflows
    #[command(subcommand)]
    Action(ActionCommand),

    /// Work with releases
    #[command(subcommand)]
    Release(ReleaseCommand),

    /// Manage the lookup cache
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Repository and pull request number
#[derive(Parser, Debug)]
pub struct PrTarget {
    /// Repository (OWNER/REPO)
    pub repo: String,

    /// Pull request number
    pub number: u64,
}

/// Which configured repositories a batch command visits
#[derive(Args, Debug, Clone, Default)]
pub struct RepoSelection {
    /// Only this repository (OWNER/REPO)
    #[arg(long)]
    pub repo: Option<String>,

    /// Regex matched against the start of repository names
    #[arg(long)]
    pub repo_filter: Option<String>,
}

/// Pull request commands
#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Show a pull request
    View(PrTarget),

    /// List open pull requests
    List {
        #[command(flatten)]
        repos: RepoSelection,

        #[command(flatten)]
        query: PrQuery,

        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Approve matching pull requests
    Approve {
        #[command(flatten)]
        repos: RepoSelection,

        #[command(flatten)]
        query: PrQuery,
    },

    /// Merge matching pull requests
    Merge {
        #[command(flatten)]
        repos: RepoSelection,

        #[command(flatten)]
        query: PrQuery,

        /// Use administrator privileges to bypass requirements
        #[arg(long)]
        admin: bool,

        /// Keep going past merges that fail
        #[arg(long)]
        skip_failing: bool,

        /// Approve each pull request before merging it
        #[arg(long)]
        with_approve: bool,
    },

    /// Update branches of matching pull requests that are behind their base
    UpdateBranch {
        #[command(flatten)]
        repos: RepoSelection,

        #[command(flatten)]
        query: PrQuery,

        /// Update regardless of merge state
        #[arg(long)]
        force: bool,
    },

    /// Open a pull request in the browser
    Open(PrTarget),
}

/// Workflow commands
#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// List workflow names
    List {
        /// Repository (OWNER/REPO)
        repo: String,
    },

    /// Dispatch a workflow
    Run {
        /// Repository (OWNER/REPO)
        repo: String,

        /// Workflow name
        name: String,
    },
}

/// Actions commands
#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    /// Dispatch the workflows of a repository
    Run {
        /// Repository (OWNER/REPO)
        repo: String,

        /// Regex matched against the start of workflow names
        #[arg(long)]
        filter: Option<String>,
    },

    /// Dispatch matching workflows across repositories
    RunMatching {
        #[command(flatten)]
        repos: RepoSelection,

        /// Regex matched against the start of workflow names
        #[arg(long)]
        filter: Option<String>,

        /// Pause after this many dispatched workflows
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        batch_size: Option<u64>,

        /// Seconds to pause between batches
        #[arg(long, default_value_t = 60)]
        batch_pause: u64,
    },

    /// Rerun the failed checks of a pull request
    Rerun(PrTarget),

    /// Rerun failed checks of matching pull requests across repositories
    RerunMatching {
        #[command(flatten)]
        repos: RepoSelection,

        #[command(flatten)]
        query: PrQuery,

        /// Only pull requests with at least one unsuccessful check
        #[arg(long)]
        failed: bool,
    },
}

/// Release commands
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Show draft releases and their notes
    List {
        #[command(flatten)]
        repos: RepoSelection,

        /// Show only the latest release of each repository
        #[arg(long)]
        summary: bool,
    },

    /// Publish draft releases (dry run unless --publish is given)
    Publish {
        #[command(flatten)]
        repos: RepoSelection,

        /// Actually publish
        #[arg(long)]
        publish: bool,
    },
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache file path
    Path,

    /// Show cache contents per operation
    Info,

    /// Remove every cached entry
    Clear,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Print the config file path
    Path,
}
