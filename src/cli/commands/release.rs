//! Release commands

use super::selected_repos;
use crate::cli::args::{ReleaseCommand, RepoSelection};
use crate::cli::output::print_json;
use crate::error::{GhmError, GhmResult};
use crate::gh::{split_release_name, CommandExecutor, GhRunner, ReleaseSummary};
use chrono::{NaiveDate, Utc};
use console::style;
use serde_json::Value;
use std::path::Path;

/// Execute a release command
pub async fn execute<E: CommandExecutor>(
    command: ReleaseCommand,
    runner: &mut GhRunner<E>,
    repos_file: &Path,
) -> GhmResult<()> {
    match command {
        ReleaseCommand::List { repos, summary } => {
            if summary {
                list_summary(runner, &repos, repos_file).await
            } else {
                list_drafts(runner, &repos, repos_file).await
            }
        }
        ReleaseCommand::Publish { repos, publish } => {
            publish_drafts(runner, &repos, publish, repos_file).await
        }
    }
}

async fn list_drafts<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    repos_file: &Path,
) -> GhmResult<()> {
    for repo in selected_repos(selection, repos_file).await? {
        let Some(release) = runner.draft_release(&repo).await? else {
            println!("Skipping repo {}, no release found\n", repo);
            continue;
        };

        let name = text(&release, "name").trim();

        println!("Release [{}]", name);
        println!(
            "    Author : {}",
            release
                .pointer("/author/login")
                .and_then(Value::as_str)
                .unwrap_or("n/a")
        );
        println!("    URL    : {}", text(&release, "html_url"));
        println!("    Tag    : {}", text(&release, "tag_name"));
        println!("    Draft  : {}", flag(&release, "draft"));
        println!("    Pre    : {}", flag(&release, "prerelease"));
        println!("    Version: {}", split_release_name(name).1);
        println!();
        println!("{}", text(&release, "body"));
        println!();
        println!("{}", "-".repeat(100));
        println!();
    }
    Ok(())
}

fn text<'a>(release: &'a Value, name: &str) -> &'a str {
    release.get(name).and_then(Value::as_str).unwrap_or("")
}

fn flag(release: &Value, name: &str) -> bool {
    release.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// One row of the release summary
#[derive(Debug, Clone, PartialEq, Eq)]
struct SummaryRow {
    repo: String,
    version: String,
    draft_available: bool,
    released: Option<NaiveDate>,
}

/// Pick the row to show from the newest two releases of `repo`
///
/// A draft on top is reported as available and the release below it is
/// shown. A repository whose only release is a draft has no release date.
fn summary_row(repo: &str, releases: &[ReleaseSummary]) -> Option<SummaryRow> {
    let row = |release: &ReleaseSummary, draft_available| SummaryRow {
        repo: repo.to_string(),
        version: release.version().to_string(),
        draft_available,
        released: release.published_at().map(|at| at.date_naive()),
    };

    match releases {
        [] => None,
        [only] if only.is_draft() => Some(SummaryRow {
            repo: repo.to_string(),
            version: "Draft".to_string(),
            draft_available: true,
            released: None,
        }),
        [first, second, ..] if first.is_draft() => Some(row(second, true)),
        [first, ..] => Some(row(first, false)),
    }
}

/// Draft-only repositories first, then oldest release first
fn sort_rows(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| a.released.cmp(&b.released));
}

fn since(released: NaiveDate, today: NaiveDate) -> String {
    match (today - released).num_days() {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        days => format!("{} days ago", days),
    }
}

async fn list_summary<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    repos_file: &Path,
) -> GhmResult<()> {
    let mut rows = Vec::new();
    for repo in selected_repos(selection, repos_file).await? {
        match summary_row(&repo, &runner.latest_releases(&repo).await?) {
            Some(row) => rows.push(row),
            None => println!("Skipping repo {}, no release found", repo),
        }
    }
    sort_rows(&mut rows);

    let today = Utc::now().date_naive();
    println!(
        "{:<40} {:<16} {:<16} {:<18} {}",
        "REPO", "LATEST VERSION", "DRAFT AVAILABLE", "LAST RELEASE DATE", "SINCE LAST RELEASE"
    );
    for row in rows {
        let (date, age) = match row.released {
            Some(date) => (date.to_string(), since(date, today)),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        println!(
            "{:<40} {:<16} {:<16} {:<18} {}",
            row.repo,
            row.version,
            if row.draft_available { "YES" } else { "NO" },
            date,
            age
        );
    }
    Ok(())
}

async fn publish_drafts<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    publish: bool,
    repos_file: &Path,
) -> GhmResult<()> {
    if !publish {
        println!(
            "{} add the `--publish` flag to actually publish\n",
            style("**DRY RUN**").yellow().bold()
        );
    }

    for repo in selected_repos(selection, repos_file).await? {
        let Some(release) = runner.draft_release(&repo).await? else {
            println!("    ** Skipping repo {}, no release found", repo);
            continue;
        };

        let id = release
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| GhmError::InvalidOutput {
                command: format!("gh api /repos/{}/releases", repo),
                reason: "draft release without an id".to_string(),
            })?;
        let (name, version) = split_release_name(text(&release, "name"));

        println!("    Publishing release for {} -> [{}/{}]", repo, name, version);
        if publish {
            let published = runner.release_publish(&repo, id, version).await?;
            print_json(&published)?;
        }
    }
    Ok(())
}
