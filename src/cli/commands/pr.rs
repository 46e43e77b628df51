//! Pull request commands
//!
//! Batch commands visit every selected repository in list order. Each
//! repository's `pr_list` goes through the cache, so a later mutation in the
//! same run makes the next lookup fetch fresh data.

use super::selected_repos;
use crate::cli::args::{OutputFormat, PrCommand, RepoSelection};
use crate::cli::output::{print_command_output, print_json, truncate};
use crate::cli::prompt;
use crate::error::{GhmError, GhmResult};
use crate::gh::checks::checks_passed;
use crate::gh::{CommandExecutor, GhRunner, PrQuery};
use console::style;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Response of the update-branch endpoint when the update was queued
const UPDATE_QUEUED: &str = "Updating pull request branch.";

/// Execute a pull request command
pub async fn execute<E: CommandExecutor>(
    command: PrCommand,
    runner: &mut GhRunner<E>,
    repos_file: &Path,
) -> GhmResult<()> {
    match command {
        PrCommand::View(target) => {
            let pr = runner.pr_get(&target.repo, target.number).await?;
            print_json(&pr)
        }
        PrCommand::List {
            repos,
            query,
            format,
        } => list(runner, &repos, &query, format, repos_file).await,
        PrCommand::Approve { repos, query } => approve(runner, &repos, &query, repos_file).await,
        PrCommand::Merge {
            repos,
            query,
            admin,
            skip_failing,
            with_approve,
        } => {
            let options = MergeOptions {
                admin,
                skip_failing,
                with_approve,
            };
            merge(runner, &repos, &query, options, repos_file).await
        }
        PrCommand::UpdateBranch {
            repos,
            query,
            force,
        } => update_branch(runner, &repos, &query, force, repos_file).await,
        PrCommand::Open(target) => {
            runner.pr_open(&target.repo, target.number).await?;
            Ok(())
        }
    }
}

async fn list<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    query: &PrQuery,
    format: OutputFormat,
    repos_file: &Path,
) -> GhmResult<()> {
    let mut rows = Vec::new();
    for repo in selected_repos(selection, repos_file).await? {
        for pr in runner.pr_list(&repo, query).await? {
            rows.push((repo.clone(), pr));
        }
    }

    match format {
        OutputFormat::Table => {
            print_pr_table(&rows);
            Ok(())
        }
        OutputFormat::Json => {
            let prs: Vec<Value> = rows
                .into_iter()
                .map(|(repo, mut pr)| {
                    if let Value::Object(fields) = &mut pr {
                        fields.insert("repo".to_string(), Value::String(repo));
                    }
                    pr
                })
                .collect();
            print_json(&prs)
        }
    }
}

async fn approve<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    query: &PrQuery,
    repos_file: &Path,
) -> GhmResult<()> {
    for repo in selected_repos(selection, repos_file).await? {
        for pr in runner.pr_list(&repo, query).await? {
            let number = pr_number(&repo, &pr)?;
            println!("    Approving {} -> {} [{}]", repo, number, title(&pr));
            let output = runner.pr_approve(&repo, number).await?;
            print_command_output(&output);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct MergeOptions {
    admin: bool,
    skip_failing: bool,
    with_approve: bool,
}

async fn merge<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    query: &PrQuery,
    options: MergeOptions,
    repos_file: &Path,
) -> GhmResult<()> {
    let mut failed = 0;

    for repo in selected_repos(selection, repos_file).await? {
        for pr in runner.pr_list(&repo, query).await? {
            let number = pr_number(&repo, &pr)?;

            if options.with_approve {
                println!("    Approving & Merging {} -> {} [{}]", repo, number, title(&pr));
                runner.pr_approve(&repo, number).await?;
            } else {
                println!("    Merging {} -> {} [{}]", repo, number, title(&pr));
            }

            match runner.pr_merge(&repo, number, options.admin).await {
                Ok(output) => print_command_output(&output),
                Err(e) => {
                    eprintln!("{} {}", style("Merge failed:").red(), e);
                    failed += 1;

                    if options.skip_failing {
                        continue;
                    }
                    if !prompt::confirm("Do you wish to continue merging?", false).await? {
                        return Err(e);
                    }
                }
            }
        }
    }

    if failed > 0 {
        println!("{} {} merge(s) failed", style("!").yellow(), failed);
    }
    Ok(())
}

async fn update_branch<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    selection: &RepoSelection,
    query: &PrQuery,
    force: bool,
    repos_file: &Path,
) -> GhmResult<()> {
    for repo in selected_repos(selection, repos_file).await? {
        for pr in runner.pr_list(&repo, query).await? {
            let number = pr_number(&repo, &pr)?;

            if !force && field(&pr, "mergeStateStatus") != "BEHIND" {
                debug!("{}#{} is not behind its base, skipping", repo, number);
                continue;
            }

            println!("    Updating branch {} -> {} [{}]", repo, number, title(&pr));
            let response = runner.pr_update_branch(&repo, number).await?;
            if response.get("message").and_then(Value::as_str) != Some(UPDATE_QUEUED) {
                println!("Unexpected response:");
                println!("    {}", response);
            }
        }
    }
    Ok(())
}

fn pr_number(repo: &str, pr: &Value) -> GhmResult<u64> {
    pr.get("number")
        .and_then(Value::as_u64)
        .ok_or_else(|| GhmError::InvalidOutput {
            command: format!("gh pr list -R {}", repo),
            reason: "pull request without a number".to_string(),
        })
}

fn title(pr: &Value) -> &str {
    field(pr, "title")
}

fn field<'a>(pr: &'a Value, name: &str) -> &'a str {
    pr.get(name).and_then(Value::as_str).unwrap_or("")
}

fn print_pr_table(rows: &[(String, Value)]) {
    if rows.is_empty() {
        println!("No open pull requests.");
        return;
    }

    println!(
        "{:<35} {:<7} {:<8} {:<12} {:<10} {:<18} {:<7} {:<20} {}",
        "REPO", "NUMBER", "STATE", "MERGEABLE", "MERGE", "REVIEW", "CHECKS", "AUTHOR", "TITLE"
    );

    for (repo, pr) in rows {
        let checks = if checks_passed(pr) {
            style("ok").green().to_string()
        } else {
            style("fail").red().to_string()
        };
        let author = pr
            .pointer("/author/login")
            .and_then(Value::as_str)
            .unwrap_or("n/a");

        println!(
            "{:<35} {:<7} {:<8} {:<12} {:<10} {:<18} {:<7} {:<20} {}",
            repo,
            pr.get("number").and_then(Value::as_u64).unwrap_or_default(),
            field(pr, "state"),
            field(pr, "mergeable"),
            field(pr, "mergeStateStatus"),
            field(pr, "reviewDecision"),
            checks,
            author,
            truncate(title(pr), 75)
        );
    }
}
