//! Pull request list filters
//!
//! Merge state and review decision are closed sets, so the `--jq` selector
//! built from them never contains caller text.

use clap::{Args, ValueEnum};

/// Merge state filter; the `!` forms exclude that state
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeState {
    #[value(name = "blocked")]
    Blocked,
    #[value(name = "!blocked")]
    NotBlocked,
    #[value(name = "clean")]
    Clean,
    #[value(name = "!clean")]
    NotClean,
    #[value(name = "draft")]
    Draft,
    #[value(name = "!draft")]
    NotDraft,
}

impl MergeState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::NotBlocked => "!blocked",
            Self::Clean => "clean",
            Self::NotClean => "!clean",
            Self::Draft => "draft",
            Self::NotDraft => "!draft",
        }
    }

    fn condition(self) -> String {
        let (negated, state) = match self {
            Self::Blocked => (false, "BLOCKED"),
            Self::NotBlocked => (true, "BLOCKED"),
            Self::Clean => (false, "CLEAN"),
            Self::NotClean => (true, "CLEAN"),
            Self::Draft => (false, "DRAFT"),
            Self::NotDraft => (true, "DRAFT"),
        };
        compare("mergeStateStatus", negated, state)
    }
}

/// Review decision filter; the `!` forms exclude that decision
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    #[value(name = "approved")]
    Approved,
    #[value(name = "!approved")]
    NotApproved,
    #[value(name = "changes_requested")]
    ChangesRequested,
    #[value(name = "!changes_requested")]
    NotChangesRequested,
    #[value(name = "review_required")]
    ReviewRequired,
    #[value(name = "!review_required")]
    NotReviewRequired,
}

impl ReviewDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::NotApproved => "!approved",
            Self::ChangesRequested => "changes_requested",
            Self::NotChangesRequested => "!changes_requested",
            Self::ReviewRequired => "review_required",
            Self::NotReviewRequired => "!review_required",
        }
    }

    fn condition(self) -> String {
        let (negated, decision) = match self {
            Self::Approved => (false, "APPROVED"),
            Self::NotApproved => (true, "APPROVED"),
            Self::ChangesRequested => (false, "CHANGES_REQUESTED"),
            Self::NotChangesRequested => (true, "CHANGES_REQUESTED"),
            Self::ReviewRequired => (false, "REVIEW_REQUIRED"),
            Self::NotReviewRequired => (true, "REVIEW_REQUIRED"),
        };
        compare("reviewDecision", negated, decision)
    }
}

fn compare(field: &str, negated: bool, value: &str) -> String {
    let op = if negated { "!=" } else { "==" };
    format!(r#".{} {} "{}""#, field, op, value)
}

/// Which open pull requests of a repository to list
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PrQuery {
    /// Keyword or GitHub search filter
    #[arg(long)]
    pub filter: Option<String>,

    /// Merge state (prefix with ! to exclude it)
    #[arg(long, value_enum)]
    pub merge_state: Option<MergeState>,

    /// Review decision (prefix with ! to exclude it)
    #[arg(long, value_enum)]
    pub review_decision: Option<ReviewDecision>,
}

impl PrQuery {
    /// jq program narrowing `gh pr list` output, if any state filter is set
    pub fn selector(&self) -> Option<String> {
        let conditions: Vec<String> = self
            .merge_state
            .map(MergeState::condition)
            .into_iter()
            .chain(self.review_decision.map(ReviewDecision::condition))
            .collect();

        if conditions.is_empty() {
            return None;
        }
        Some(format!("[.[] | select({})]", conditions.join(" and ")))
    }
}
