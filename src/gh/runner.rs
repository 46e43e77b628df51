//! `gh` operations with caching
//!
//! Lookups go through [`read_through`], mutations through [`invalidate`].
//! The runner owns the process's [`CacheSession`]; call [`GhRunner::close`]
//! to persist it and observe write failures.

use crate::cache::{invalidate, read_through, CacheSession, CacheStore, CallArgs};
use crate::config::Config;
use crate::error::{GhmError, GhmResult};
use crate::gh::executor::{CommandExecutor, CommandOutput, GhCli};
use crate::gh::filter::{MergeState, PrQuery, ReviewDecision};
use crate::gh::release::{parse_release_list, ReleaseSummary};
use serde_json::Value;
use std::path::PathBuf;

/// Fields requested for pull request lookups
const PR_FIELDS: &str =
    "author,number,state,title,url,reviewDecision,statusCheckRollup,mergeable,mergeStateStatus";

/// Runs `gh` commands, memoizing lookups in a persistent cache
pub struct GhRunner<E = GhCli> {
    executor: E,
    cache: CacheSession,
}

impl GhRunner<GhCli> {
    /// Runner backed by the real `gh` binary and the cache file at `cache_path`
    pub fn from_config(config: &Config, cache_path: impl Into<PathBuf>) -> Self {
        Self::new(GhCli::new(&config.gh), CacheSession::open(cache_path))
    }
}

impl<E: CommandExecutor> GhRunner<E> {
    pub fn new(executor: E, cache: CacheSession) -> Self {
        Self { executor, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        self.cache.store()
    }

    /// Persist the cache and release the runner
    pub fn close(self) -> GhmResult<()> {
        self.cache.close()
    }

    /// Get a pull request by number
    pub async fn pr_get(&mut self, repo: &str, number: u64) -> GhmResult<Value> {
        let args = CallArgs::new().arg(repo).try_arg(number)?;
        let number = number.to_string();
        let argv = argv(&["pr", "view", "--json", PR_FIELDS, "-R", repo, &number]);

        let executor = &self.executor;
        read_through(self.cache.store_mut(), "pr_get", &args, || {
            run_json(executor, &argv)
        })
        .await
    }

    /// List open pull requests matching `query`
    pub async fn pr_list(&mut self, repo: &str, query: &PrQuery) -> GhmResult<Vec<Value>> {
        let args = CallArgs::new()
            .arg(repo)
            .named("filter", query.filter.as_deref())
            .named("merge_state", query.merge_state.map(MergeState::as_str))
            .named(
                "review_decision",
                query.review_decision.map(ReviewDecision::as_str),
            );

        let mut argv = argv(&["pr", "list", "-R", repo, "--json", PR_FIELDS]);
        if let Some(filter) = &query.filter {
            argv.extend(["--search".to_string(), filter.clone()]);
        }
        if let Some(selector) = query.selector() {
            argv.extend(["--jq".to_string(), selector]);
        }

        let executor = &self.executor;
        read_through(self.cache.store_mut(), "pr_list", &args, || async {
            match run_json(executor, &argv).await? {
                Value::Array(prs) => Ok(prs),
                _ => Err(GhmError::InvalidOutput {
                    command: format!("gh pr list -R {}", repo),
                    reason: "expected a list of pull requests".to_string(),
                }),
            }
        })
        .await
    }

    /// Open a pull request in the browser
    pub async fn pr_open(&self, repo: &str, number: u64) -> GhmResult<CommandOutput> {
        let number = number.to_string();
        self.executor
            .execute(&argv(&["pr", "view", "-R", repo, &number, "-w"]))
            .await
    }

    /// Approve a pull request
    pub async fn pr_approve(&mut self, repo: &str, number: u64) -> GhmResult<CommandOutput> {
        let number = number.to_string();
        let argv = argv(&["pr", "review", "-R", repo, &number, "--approve"]);

        let executor = &self.executor;
        invalidate(self.cache.store_mut(), "pr_approve", || {
            executor.execute(&argv)
        })
        .await
    }

    /// Merge a pull request with a merge commit
    pub async fn pr_merge(
        &mut self,
        repo: &str,
        number: u64,
        admin: bool,
    ) -> GhmResult<CommandOutput> {
        let number = number.to_string();
        let mut argv = argv(&["pr", "merge", "-R", repo, &number, "-m"]);
        if admin {
            argv.push("--admin".to_string());
        }

        let executor = &self.executor;
        invalidate(self.cache.store_mut(), "pr_merge", || {
            executor.execute(&argv)
        })
        .await
    }

    /// Update a pull request branch from its base
    pub async fn pr_update_branch(&mut self, repo: &str, number: u64) -> GhmResult<Value> {
        let argv = argv(&[
            "api",
            "-X",
            "PUT",
            "-H",
            "Accept: application/vnd.github.lydian-preview+json",
            &format!("/repos/{}/pulls/{}/update-branch", repo, number),
        ]);

        let executor = &self.executor;
        invalidate(self.cache.store_mut(), "pr_update_branch", || {
            run_json(executor, &argv)
        })
        .await
    }

    /// Fetch an Actions job by id
    pub async fn action_job(&mut self, repo: &str, job_id: u64) -> GhmResult<Value> {
        let args = CallArgs::new().arg(repo).try_arg(job_id)?;
        let argv = argv(&["api", &format!("/repos/{}/actions/jobs/{}", repo, job_id)]);

        let executor = &self.executor;
        read_through(self.cache.store_mut(), "action_job", &args, || {
            run_json(executor, &argv)
        })
        .await
    }

    /// Rerun the workflow run a failed job belongs to
    pub async fn action_rerun(&mut self, repo: &str, job_id: u64) -> GhmResult<CommandOutput> {
        let job = self.action_job(repo, job_id).await?;
        let run_id = job
            .get("run_id")
            .and_then(Value::as_u64)
            .ok_or_else(|| GhmError::InvalidOutput {
                command: format!("gh api /repos/{}/actions/jobs/{}", repo, job_id),
                reason: "missing run_id".to_string(),
            })?
            .to_string();
        let argv = argv(&["run", "rerun", "-R", repo, &run_id]);

        let executor = &self.executor;
        invalidate(self.cache.store_mut(), "action_rerun", || {
            executor.execute(&argv)
        })
        .await
    }

    /// List workflow names of a repository
    pub async fn workflow_list(&mut self, repo: &str) -> GhmResult<Vec<String>> {
        let args = CallArgs::new().arg(repo);
        let argv = argv(&["workflow", "list", "-R", repo]);

        let executor = &self.executor;
        read_through(self.cache.store_mut(), "workflow_list", &args, || async {
            let output = executor.execute(&argv).await?;
            Ok::<_, GhmError>(parse_workflow_names(&output.stdout))
        })
        .await
    }

    /// Dispatch a workflow
    ///
    /// Not cached and does not invalidate: dispatching changes no state that
    /// the cached lookups return.
    pub async fn workflow_run(&self, repo: &str, name: &str) -> GhmResult<CommandOutput> {
        self.executor
            .execute(&argv(&["workflow", "run", "-R", repo, name]))
            .await
    }

    /// Fetch the first draft release of a repository, if any
    pub async fn draft_release(&mut self, repo: &str) -> GhmResult<Option<Value>> {
        let args = CallArgs::new().arg(repo);
        let path = format!("/repos/{}/releases", repo);
        let argv = argv(&["api", &path]);

        let executor = &self.executor;
        read_through(self.cache.store_mut(), "draft_release", &args, || async {
            match run_json(executor, &argv).await? {
                Value::Array(releases) => Ok(releases
                    .into_iter()
                    .find(|r| r.get("draft").and_then(Value::as_bool) == Some(true))),
                _ => Err(GhmError::InvalidOutput {
                    command: format!("gh api {}", path),
                    reason: "expected a list of releases".to_string(),
                }),
            }
        })
        .await
    }

    /// The two most recent releases of a repository, newest first
    ///
    /// Not cached: the summary is meant to show what was just released.
    pub async fn latest_releases(&self, repo: &str) -> GhmResult<Vec<ReleaseSummary>> {
        let output = self
            .executor
            .execute(&argv(&["release", "list", "-R", repo, "-L", "2"]))
            .await?;
        Ok(parse_release_list(&output.stdout))
    }

    /// Publish a draft release under `v{tag}`
    pub async fn release_publish(&mut self, repo: &str, id: u64, tag: &str) -> GhmResult<Value> {
        let argv = argv(&[
            "api",
            &format!("/repos/{}/releases/{}", repo, id),
            "-X",
            "PATCH",
            "-F",
            "draft=false",
            "-F",
            &format!("tag_name=v{}", tag),
        ]);

        let executor = &self.executor;
        invalidate(self.cache.store_mut(), "release_publish", || {
            run_json(executor, &argv)
        })
        .await
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

async fn run_json<E: CommandExecutor>(executor: &E, argv: &[String]) -> GhmResult<Value> {
    let output = executor.execute(argv).await?;
    serde_json::from_str(&output.stdout).map_err(|e| GhmError::InvalidOutput {
        command: format!("gh {}", argv.join(" ")),
        reason: e.to_string(),
    })
}

// `gh workflow list` prints NAME, STATE and ID columns; names may contain spaces
fn parse_workflow_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            (words.len() > 2).then(|| words[..words.len() - 2].join(" "))
        })
        .collect()
}
