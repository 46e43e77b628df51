//! Status check evaluation for pull requests
//!
//! Works on the `statusCheckRollup` field of `gh pr view/list --json`, which
//! mixes Actions check runs and legacy commit status contexts.

use serde_json::Value;

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or("")
}

fn rollup(pr: &Value) -> &[Value] {
    pr.get("statusCheckRollup")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Whether a single check run or status context succeeded
pub fn check_ok(check: &Value) -> bool {
    match field(check, "__typename") {
        "CheckRun" => field(check, "status") == "COMPLETED" && field(check, "conclusion") == "SUCCESS",
        // Status contexts carry no run status or conclusion, only a state
        "StatusContext" => {
            field(check, "status").is_empty()
                && field(check, "conclusion").is_empty()
                && field(check, "state") == "SUCCESS"
        }
        _ => false,
    }
}

/// Whether every status check of a pull request succeeded
pub fn checks_passed(pr: &Value) -> bool {
    rollup(pr).iter().all(check_ok)
}

/// Checks that concluded with a failure
pub fn failed_checks(pr: &Value) -> impl Iterator<Item = &Value> {
    rollup(pr)
        .iter()
        .filter(|check| field(check, "conclusion") == "FAILURE")
}

/// Actions job id of a check run, taken from the end of its details URL
pub fn job_id(check: &Value) -> Option<u64> {
    field(check, "detailsUrl")
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
}
