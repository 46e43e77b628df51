//! Managed repository list
//!
//! The list is a JSON array of `OWNER/REPO` names. Batch commands narrow it
//! with `--repo` (exact name) and `--repo-filter` (regex matched from the
//! start of the name).

use crate::error::{GhmError, GhmResult};
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Load the repository list at `path`
pub async fn load_repos(path: &Path) -> GhmResult<Vec<String>> {
    let invalid = |reason: String| GhmError::RepoList {
        path: path.to_path_buf(),
        reason,
    };

    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(invalid("file not found".to_string()))
        }
        Err(e) => return Err(invalid(e.to_string())),
    };

    let repos: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| invalid(format!("expected a JSON array of strings ({})", e)))?;

    debug!("Loaded {} repositories from {}", repos.len(), path.display());
    Ok(repos)
}

/// Regex that must match at the start of the subject
#[derive(Debug, Clone)]
pub struct PrefixPattern(Regex);

impl PrefixPattern {
    pub fn new(pattern: &str) -> GhmResult<Self> {
        Regex::new(&format!("^(?:{})", pattern))
            .map(Self)
            .map_err(|e| GhmError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// `None` matches everything
    pub fn optional(pattern: Option<&str>) -> GhmResult<Option<Self>> {
        pattern.map(Self::new).transpose()
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.0.is_match(subject)
    }
}

/// Repositories named by `repo` and matched by `filter`, in list order
pub fn select_repos(
    repos: &[String],
    repo: Option<&str>,
    filter: Option<&str>,
) -> GhmResult<Vec<String>> {
    let pattern = PrefixPattern::optional(filter)?;

    let selected: Vec<String> = repos
        .iter()
        .filter(|r| repo.map_or(true, |wanted| r.as_str() == wanted))
        .filter(|r| pattern.as_ref().map_or(true, |p| p.is_match(r)))
        .cloned()
        .collect();

    if let Some(wanted) = repo {
        if !repos.iter().any(|r| r == wanted) {
            warn!("{} is not in the repository list", wanted);
        }
    }

    Ok(selected)
}
