//! Integration tests for ghm

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// ghm isolated from the user's config and cache
fn ghm(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("ghm");
    cmd.env("GHM_CONFIG", dir.path().join("config.toml"))
        .env("GHM_CACHE_FILE", cache_file(dir))
        .env("GHM_REPOS_FILE", repos_file(dir))
        .env_remove("GHM_LOG");
    cmd
}

fn repos_file(dir: &TempDir) -> PathBuf {
    dir.path().join("repos.json")
}

fn write_repos(dir: &TempDir, repos: &[&str]) {
    fs::write(repos_file(dir), serde_json::to_string(repos).unwrap()).unwrap();
}

fn cache_file(dir: &TempDir) -> PathBuf {
    dir.path().join("cache.json")
}

fn read_cache(dir: &TempDir) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(cache_file(dir)).unwrap()).unwrap()
}

fn use_gh_binary(dir: &TempDir, binary: &Path) {
    fs::write(
        dir.path().join("config.toml"),
        format!("[gh]\nbinary = {:?}\n", binary.display().to_string()),
    )
    .unwrap();
}

mod cli_tests {
    use super::*;

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        ghm(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("read-through cache"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        ghm(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ghm"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        ghm(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[gh]"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[gh\n").unwrap();

        ghm(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn missing_gh_reports_hint() {
        let dir = TempDir::new().unwrap();
        use_gh_binary(&dir, &dir.path().join("no-such-gh"));

        ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Command failed"))
            .stderr(predicate::str::contains("Hint:"));

        assert_eq!(read_cache(&dir), serde_json::json!({}));
    }
}

mod repos_tests {
    use super::*;

    #[test]
    fn repos_lists_configured_repositories() {
        let dir = TempDir::new().unwrap();
        write_repos(&dir, &["acme/widgets", "acme/gadgets"]);

        ghm(&dir)
            .arg("repos")
            .assert()
            .success()
            .stdout(predicate::str::contains("repos.json"))
            .stdout(predicate::str::contains("\tacme/widgets\n\tacme/gadgets"));
    }

    #[test]
    fn missing_repo_list_reports_hint() {
        let dir = TempDir::new().unwrap();

        ghm(&dir)
            .arg("repos")
            .assert()
            .failure()
            .stderr(predicate::str::contains("file not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_repo_filter_is_rejected_before_gh_runs() {
        let dir = TempDir::new().unwrap();
        write_repos(&dir, &["acme/widgets"]);
        use_gh_binary(&dir, &dir.path().join("no-such-gh"));

        ghm(&dir)
            .args(["pr", "list", "--repo-filter", "acme/("])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid pattern"));
    }

    #[test]
    fn unknown_merge_state_is_rejected() {
        let dir = TempDir::new().unwrap();

        ghm(&dir)
            .args(["pr", "list", "--merge-state", "clean\" or true"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}

mod cache_tests {
    use super::*;

    #[test]
    fn cache_path_follows_override() {
        let dir = TempDir::new().unwrap();
        ghm(&dir)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache.json"));
    }

    #[test]
    fn cache_info_missing_file() {
        let dir = TempDir::new().unwrap();
        ghm(&dir)
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Entries: 0"));

        assert!(!cache_file(&dir).exists());
    }

    #[test]
    fn cache_info_counts_operations() {
        let dir = TempDir::new().unwrap();
        fs::write(
            cache_file(&dir),
            r#"{"pr_get:[\"a/b\",1]:{}": {"number": 1}, "pr_get:[\"a/b\",2]:{}": {"number": 2}}"#,
        )
        .unwrap();

        ghm(&dir)
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Entries: 2"))
            .stdout(predicate::str::contains("pr_get"));
    }

    #[test]
    fn cache_info_tolerates_corruption() {
        let dir = TempDir::new().unwrap();
        fs::write(cache_file(&dir), "{\"truncated\": ").unwrap();

        ghm(&dir)
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Warning:"))
            .stdout(predicate::str::contains("Entries: 0"));

        assert_eq!(
            fs::read_to_string(cache_file(&dir)).unwrap(),
            "{\"truncated\": "
        );
    }

    #[test]
    fn cache_clear_empties_file() {
        let dir = TempDir::new().unwrap();
        fs::write(cache_file(&dir), r#"{"a:[]:{}": 1, "b:[]:{}": 2}"#).unwrap();

        ghm(&dir)
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 2 cache entries"));

        assert_eq!(read_cache(&dir), serde_json::json!({}));
    }
}

#[cfg(unix)]
mod fake_gh_tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    // Logs every call; widgets#42 is behind and cannot be merged, Docs has
    // no workflow_dispatch trigger
    const FAKE_GH: &str = r##"#!/bin/sh
echo "$*" >> "$GHM_FAKE_LOG"
case "$1 $2" in
  "pr view")
    echo '{"number":42,"title":"Bump deps","statusCheckRollup":[{"__typename":"CheckRun","name":"test","status":"COMPLETED","conclusion":"FAILURE","detailsUrl":"https://github.com/acme/widgets/actions/runs/99/job/7001"}]}' ;;
  "pr list")
    case "$4" in
      acme/widgets) echo '[{"number":42,"title":"Bump deps","mergeStateStatus":"BEHIND"}]' ;;
      *) echo '[{"number":7,"title":"Fix typo","mergeStateStatus":"CLEAN"}]' ;;
    esac ;;
  "pr review") echo "approved $4 $5" ;;
  "pr merge")
    if [ "$5" = "42" ]; then echo "Pull request is not mergeable" >&2; exit 1; fi
    echo "merged $4 $5" ;;
  "workflow list") printf 'CI\tactive\t1\nDocs\tactive\t2\n' ;;
  "workflow run")
    if [ "$5" = "Docs" ]; then
      echo "could not create workflow dispatch event: HTTP 422: Workflow does not have 'workflow_dispatch' trigger" >&2
      exit 1
    fi
    echo "dispatched $5" ;;
  "run rerun") echo "rerun requested for $5" ;;
  "release list")
    printf 'Widgets 1.3.0\tDraft\tv1.3.0\t2024-05-02T10:00:00Z\nWidgets 1.2.0\tLatest\tv1.2.0\t2024-04-01T09:30:00Z\n' ;;
  *)
    case "$*" in
      *update-branch) echo '{"message":"Updating pull request branch."}' ;;
      *actions/jobs/*) echo '{"id":7001,"run_id":99}' ;;
      *"-X PATCH"*) echo '{"id":5,"draft":false}' ;;
      *releases) echo '[{"id":5,"name":"Widgets 1.3.0","draft":true,"tag_name":"v1.3.0","author":{"login":"octocat"}}]' ;;
      *) echo "unexpected: $*" >&2; exit 1 ;;
    esac ;;
esac
"##;

    fn install_fake_gh(dir: &TempDir) -> PathBuf {
        let script = dir.path().join("gh");
        fs::write(&script, FAKE_GH).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        use_gh_binary(dir, &script);
        write_repos(dir, &["acme/widgets", "acme/gadgets"]);
        script
    }

    fn fake_ghm(dir: &TempDir) -> Command {
        let mut cmd = ghm(dir);
        cmd.env("GHM_FAKE_LOG", dir.path().join("calls.log"));
        cmd
    }

    fn calls(dir: &TempDir, prefix: &str) -> usize {
        fs::read_to_string(dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    fn cache_len(dir: &TempDir) -> usize {
        read_cache(dir).as_object().unwrap().len()
    }

    #[test]
    fn lookup_is_cached_across_runs_until_mutation() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title": "Bump deps""#));
        assert_eq!(calls(&dir, "pr view"), 1);

        fake_ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""number": 42"#));
        assert_eq!(calls(&dir, "pr view"), 1);

        fake_ghm(&dir)
            .args(["pr", "approve", "--repo", "acme/widgets"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Approving acme/widgets -> 42 [Bump deps]"))
            .stdout(predicate::str::contains("approved acme/widgets 42"));
        assert_eq!(calls(&dir, "pr review"), 1);
        assert_eq!(read_cache(&dir), serde_json::json!({}));

        fake_ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .success();
        assert_eq!(calls(&dir, "pr view"), 2);
    }

    #[test]
    fn pr_list_spans_selected_repos_and_is_cached() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        for _ in 0..2 {
            fake_ghm(&dir)
                .args(["pr", "list"])
                .assert()
                .success()
                .stdout(predicate::str::contains("acme/widgets"))
                .stdout(predicate::str::contains("Fix typo"));
        }
        assert_eq!(calls(&dir, "pr list"), 2);

        fake_ghm(&dir)
            .args(["pr", "list", "--repo-filter", "acme/g", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""repo": "acme/gadgets""#))
            .stdout(predicate::str::contains("acme/widgets").not());
        assert_eq!(calls(&dir, "pr list"), 2);

        fake_ghm(&dir)
            .args(["pr", "list", "--merge-state", "!clean"])
            .assert()
            .success();
        assert_eq!(calls(&dir, "pr list"), 4);
    }

    #[test]
    fn approve_purges_between_repos() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir).args(["pr", "list"]).assert().success();
        assert_eq!(cache_len(&dir), 2);

        // widgets is a hit; its approval purges, so gadgets is fetched again
        fake_ghm(&dir)
            .args(["pr", "approve"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Approving acme/gadgets -> 7 [Fix typo]"));

        assert_eq!(calls(&dir, "pr list -R acme/widgets"), 1);
        assert_eq!(calls(&dir, "pr list -R acme/gadgets"), 2);
        assert_eq!(calls(&dir, "pr review"), 2);
        assert_eq!(cache_len(&dir), 0);
    }

    #[test]
    fn failed_merge_stops_and_keeps_cache() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .success();

        fake_ghm(&dir)
            .args(["pr", "merge"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not mergeable"));

        assert_eq!(calls(&dir, "pr merge"), 1);
        assert_eq!(calls(&dir, "pr list -R acme/gadgets"), 0);
        assert_eq!(cache_len(&dir), 2);
    }

    #[test]
    fn merge_skip_failing_keeps_going() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["pr", "merge", "--skip-failing", "--admin"])
            .assert()
            .success()
            .stdout(predicate::str::contains("merged acme/gadgets 7"))
            .stdout(predicate::str::contains("1 merge(s) failed"));

        assert_eq!(calls(&dir, "pr merge"), 2);
        assert_eq!(calls(&dir, "pr merge -R acme/gadgets 7 -m --admin"), 1);
        assert_eq!(cache_len(&dir), 0);
    }

    #[test]
    fn merge_with_approve_approves_first() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["pr", "merge", "--repo", "acme/gadgets", "--with-approve"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Approving & Merging acme/gadgets -> 7"));

        let log = fs::read_to_string(dir.path().join("calls.log")).unwrap();
        let review = log.find("pr review").unwrap();
        let merge = log.find("pr merge").unwrap();
        assert!(review < merge);
    }

    #[test]
    fn update_branch_only_when_behind_unless_forced() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["pr", "update-branch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updating branch acme/widgets -> 42"))
            .stdout(predicate::str::contains("acme/gadgets").not());
        assert_eq!(calls(&dir, "api -X PUT"), 1);

        fake_ghm(&dir)
            .args(["pr", "update-branch", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updating branch acme/gadgets -> 7"));
        assert_eq!(calls(&dir, "api -X PUT"), 3);
    }

    #[test]
    fn run_matching_skips_non_runnable_and_batches() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["action", "run-matching", "--batch-size", "1", "--batch-pause", "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipped acme/widgets/Docs, not runnable"))
            .stdout(predicate::str::contains("Batch submitted"));
        assert_eq!(calls(&dir, "workflow run"), 4);
        assert_eq!(calls(&dir, "workflow list"), 2);

        fake_ghm(&dir)
            .args(["action", "run-matching", "--repo", "acme/gadgets", "--filter", "C"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Running acme/gadgets -> CI"))
            .stdout(predicate::str::contains("Docs").not());
        assert_eq!(calls(&dir, "workflow run"), 5);
        assert_eq!(calls(&dir, "workflow list"), 2);
    }

    #[test]
    fn rerun_reruns_failed_checks_of_a_pr() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["action", "rerun", "acme/widgets", "42"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rerunning acme/widgets -> test"))
            .stdout(predicate::str::contains("rerun requested for 99"));

        assert_eq!(calls(&dir, "api /repos/acme/widgets/actions/jobs/7001"), 1);
        assert_eq!(calls(&dir, "run rerun -R acme/widgets 99"), 1);
        assert_eq!(cache_len(&dir), 0);
    }

    #[test]
    fn release_publish_is_dry_run_by_default() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["release", "publish", "--repo", "acme/widgets"])
            .assert()
            .success()
            .stdout(predicate::str::contains("DRY RUN"))
            .stdout(predicate::str::contains(
                "Publishing release for acme/widgets -> [Widgets/1.3.0]",
            ));
        assert_eq!(calls(&dir, "api /repos/acme/widgets/releases/5"), 0);
        assert_eq!(cache_len(&dir), 1);

        fake_ghm(&dir)
            .args(["release", "publish", "--repo", "acme/widgets", "--publish"])
            .assert()
            .success();
        assert_eq!(
            calls(
                &dir,
                "api /repos/acme/widgets/releases/5 -X PATCH -F draft=false -F tag_name=v1.3.0"
            ),
            1
        );
        assert_eq!(cache_len(&dir), 0);
    }

    #[test]
    fn release_list_shows_drafts_and_summary() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);

        fake_ghm(&dir)
            .args(["release", "list", "--repo", "acme/widgets"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Release [Widgets 1.3.0]"))
            .stdout(predicate::str::contains("Author : octocat"));

        for _ in 0..2 {
            fake_ghm(&dir)
                .args(["release", "list", "--summary"])
                .assert()
                .success()
                .stdout(predicate::str::contains("LATEST VERSION"))
                .stdout(predicate::str::contains("1.2.0"))
                .stdout(predicate::str::contains("2024-04-01"));
        }
        assert_eq!(calls(&dir, "release list"), 4);
    }

    #[test]
    fn corrupted_cache_does_not_block_lookups() {
        let dir = TempDir::new().unwrap();
        install_fake_gh(&dir);
        fs::write(cache_file(&dir), "not json at all").unwrap();

        fake_ghm(&dir)
            .args(["pr", "view", "acme/widgets", "42"])
            .assert()
            .success();

        assert_eq!(cache_len(&dir), 1);
    }
}
