//! Actions commands - dispatch workflows and rerun failed checks

use super::selected_repos;
use crate::cli::args::ActionCommand;
use crate::cli::output::print_command_output;
use crate::config::PrefixPattern;
use crate::error::{GhmError, GhmResult};
use crate::gh::checks::{checks_passed, failed_checks, job_id};
use crate::gh::{CommandExecutor, GhRunner};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// gh's answer for workflows without a `workflow_dispatch` trigger
const NOT_RUNNABLE: &str =
    "could not create workflow dispatch event: HTTP 422: Workflow does not have 'workflow_dispatch' trigger";

/// Execute an Actions command
pub async fn execute<E: CommandExecutor>(
    command: ActionCommand,
    runner: &mut GhRunner<E>,
    repos_file: &Path,
) -> GhmResult<()> {
    match command {
        ActionCommand::Run { repo, filter } => {
            let pattern = PrefixPattern::optional(filter.as_deref())?;
            let mut batch = Batch::unlimited();
            run_workflows(runner, &repo, pattern.as_ref(), &mut batch).await
        }
        ActionCommand::RunMatching {
            repos,
            filter,
            batch_size,
            batch_pause,
        } => {
            let pattern = PrefixPattern::optional(filter.as_deref())?;
            let mut batch = Batch::new(batch_size, Duration::from_secs(batch_pause));
            for repo in selected_repos(&repos, repos_file).await? {
                run_workflows(runner, &repo, pattern.as_ref(), &mut batch).await?;
            }
            Ok(())
        }
        ActionCommand::Rerun(target) => {
            let pr = runner.pr_get(&target.repo, target.number).await?;
            rerun_failed(runner, &target.repo, &pr).await
        }
        ActionCommand::RerunMatching {
            repos,
            query,
            failed,
        } => {
            for repo in selected_repos(&repos, repos_file).await? {
                let prs = runner.pr_list(&repo, &query).await?;
                for pr in prs.iter().filter(|pr| !failed || !checks_passed(pr)) {
                    rerun_failed(runner, &repo, pr).await?;
                }
            }
            Ok(())
        }
    }
}

/// Pauses after every `size` dispatched workflows
#[derive(Debug)]
struct Batch {
    size: Option<u64>,
    pause: Duration,
    dispatched: u64,
}

impl Batch {
    fn new(size: Option<u64>, pause: Duration) -> Self {
        Self {
            size,
            pause,
            dispatched: 0,
        }
    }

    fn unlimited() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Record one dispatch; true when a batch just filled up
    fn record(&mut self) -> bool {
        self.dispatched += 1;
        self.size.is_some_and(|size| self.dispatched % size == 0)
    }

    async fn after_dispatch(&mut self) {
        if self.record() {
            println!("    *** Batch submitted, pausing {}s ***", self.pause.as_secs());
            tokio::time::sleep(self.pause).await;
        }
    }
}

async fn run_workflows<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    repo: &str,
    pattern: Option<&PrefixPattern>,
    batch: &mut Batch,
) -> GhmResult<()> {
    for workflow in runner.workflow_list(repo).await? {
        if pattern.is_some_and(|p| !p.is_match(&workflow)) {
            continue;
        }

        println!("    Running {} -> {}", repo, workflow);
        match runner.workflow_run(repo, &workflow).await {
            Ok(output) => {
                print_command_output(&output);
                batch.after_dispatch().await;
            }
            Err(e) if is_not_runnable(&e) => {
                println!("        Skipped {}/{}, not runnable", repo, workflow);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn is_not_runnable(err: &GhmError) -> bool {
    matches!(err, GhmError::CommandExecution { stderr, .. } if stderr.trim().starts_with(NOT_RUNNABLE))
}

async fn rerun_failed<E: CommandExecutor>(
    runner: &mut GhRunner<E>,
    repo: &str,
    pr: &Value,
) -> GhmResult<()> {
    for check in failed_checks(pr) {
        let name = check.get("name").and_then(Value::as_str).unwrap_or("?");
        let url = check.get("detailsUrl").and_then(Value::as_str).unwrap_or("");

        let Some(job) = job_id(check) else {
            warn!("No Actions job behind check {} ({}), skipping", name, url);
            continue;
        };

        println!("    Rerunning {} -> {} ({})", repo, name, url);
        let output = runner.action_rerun(repo, job).await?;
        print_command_output(&output);
    }
    Ok(())
}
