//! Release listing helpers

use chrono::{DateTime, FixedOffset};

/// One line of `gh release list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub title: String,
    /// `Latest`, `Draft`, `Pre-release` or empty
    pub kind: String,
    pub tag: String,
    pub published: String,
}

impl ReleaseSummary {
    pub fn is_draft(&self) -> bool {
        self.kind == "Draft"
    }

    pub fn version(&self) -> &str {
        split_release_name(&self.title).1
    }

    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.published).ok()
    }
}

/// Parse tab separated `gh release list` output
pub fn parse_release_list(stdout: &str) -> Vec<ReleaseSummary> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split('\t').map(str::trim);
            let mut next = || fields.next().unwrap_or_default().to_string();
            ReleaseSummary {
                title: next(),
                kind: next(),
                tag: next(),
                published: next(),
            }
        })
        .collect()
}

/// Split a release name like `Paketo Java 1.2.3` into its name and version
///
/// The version is the last word of the name.
pub fn split_release_name(name: &str) -> (String, &str) {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.split_last() {
        Some((version, rest)) => (rest.join(" "), version),
        None => (String::new(), ""),
    }
}
