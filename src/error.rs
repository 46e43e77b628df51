//! Error types for ghm
//!
//! All modules use `GhmResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ghm operations
pub type GhmResult<T> = Result<T, GhmError>;

/// All errors that can occur in ghm
#[derive(Error, Debug)]
pub enum GhmError {
    // Cache key errors
    #[error("Unsupported argument type: {0}")]
    UnsupportedArgumentType(String),

    #[error("Invalid operation name: {0:?}")]
    InvalidOperationName(String),

    // Cache persistence errors
    #[error("Failed to load cache from {path}: {reason}")]
    PersistenceLoad { path: PathBuf, reason: String },

    #[error("Failed to persist cache to {path}: {source}")]
    PersistenceStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Cannot use repository list {path}: {reason}")]
    RepoList { path: PathBuf, reason: String },

    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Unexpected output from {command}: {reason}")]
    InvalidOutput { command: String, reason: String },

    #[error("Interrupted")]
    Interrupted,

    #[error("Prompt failed: {0}")]
    Prompt(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl GhmError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an unsupported argument error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedArgumentType(what.into())
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Install the GitHub CLI from https://cli.github.com or set [gh] binary")
            }
            Self::CommandExecution { stderr, .. } if stderr.contains("gh auth login") => {
                Some("Run: gh auth login")
            }
            Self::PersistenceStore { .. } => Some("Check permissions of the cache directory"),
            Self::ConfigInvalid { .. } => Some("Fix or remove the file, or point --config elsewhere"),
            Self::RepoList { .. } => Some(
                "Write a JSON array of OWNER/REPO names there, or set --repos-file / [repos] file",
            ),
            _ => None,
        }
    }
}
