//! Local-clone ingestion.
//!
//! Shallow-clones the repository into a scoped temp directory, extracts the
//! most recent non-merge commits with per-file numstat counts, and parses
//! the output into commit records. Both subprocess stages run under
//! independent timeouts; expiry of either fails the whole pass; partial
//! results are never salvaged. The temp clone is owned by a `TempDir`, so it
//! is released on every exit path.

use crate::config::Settings;
use crate::error::{Result, TimelineError};
use crate::ingest::log_format;
use crate::models::CommitRecord;
use log::{debug, info};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

const LOG_FORMAT: &str = "%H|%s|%an|%ae|%aI";

/// Clone `source` and return its recent history, most-recent-first, with
/// `file_changes` always populated.
pub async fn ingest(
    source: &str,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<Vec<CommitRecord>> {
    let workdir = tempfile::tempdir()?;
    debug!("cloning {source} into {:?}", workdir.path());

    let output = run_bounded(
        "clone",
        clone_command(source, workdir.path(), settings.clone_depth),
        Duration::from_secs(settings.clone_timeout_secs),
        cancel,
    )
    .await?;
    if !output.status.success() {
        return Err(TimelineError::CloneFailed(stderr_excerpt(&output)));
    }

    if cancel.is_cancelled() {
        return Err(TimelineError::Cancelled);
    }

    let output = run_bounded(
        "history extraction",
        log_command(workdir.path(), settings.max_commits),
        Duration::from_secs(settings.log_timeout_secs),
        cancel,
    )
    .await?;
    if !output.status.success() {
        return Err(TimelineError::LogFailed(stderr_excerpt(&output)));
    }

    let commits = log_format::parse_log(&String::from_utf8_lossy(&output.stdout));
    info!("extracted {} commits from {source}", commits.len());
    Ok(commits)
}

fn clone_command(source: &str, dir: &Path, depth: u32) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("clone")
        .arg("--quiet")
        .arg("--single-branch")
        .arg("--depth")
        .arg(depth.to_string())
        .arg(source)
        .arg(dir);
    cmd
}

fn log_command(dir: &Path, max_commits: usize) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir)
        .arg("log")
        .arg("--no-merges")
        .arg("-n")
        .arg(max_commits.to_string())
        .arg(format!("--pretty=format:{LOG_FORMAT}"))
        .arg("--numstat");
    cmd
}

/// Run one subprocess stage under a deadline and the caller's cancellation
/// token. The child is killed when either fires.
async fn run_bounded(
    stage: &'static str,
    mut cmd: Command,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Output> {
    cmd.kill_on_drop(true);

    tokio::select! {
        _ = cancel.cancelled() => Err(TimelineError::Cancelled),
        outcome = tokio::time::timeout(deadline, cmd.output()) => match outcome {
            Err(_) => Err(TimelineError::Timeout {
                stage,
                seconds: deadline.as_secs(),
            }),
            Ok(result) => Ok(result?),
        },
    }
}

fn stderr_excerpt(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let excerpt: String = stderr.trim().chars().take(400).collect();
    if excerpt.is_empty() {
        format!("exit status {}", output.status)
    } else {
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_token_aborts_before_any_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut cmd = Command::new("git");
        cmd.arg("--version");
        let result = run_bounded("clone", cmd, Duration::from_secs(5), &cancel).await;
        assert!(matches!(result, Err(TimelineError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_expiry_reports_the_stage() {
        let cancel = CancellationToken::new();

        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_bounded("clone", cmd, Duration::from_millis(50), &cancel).await;
        match result {
            Err(TimelineError::Timeout { stage, .. }) => assert_eq!(stage, "clone"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clone_failure_surfaces_stderr() {
        let cancel = CancellationToken::new();
        let settings = Settings::default();

        let result = ingest("/nonexistent/repo/path", &settings, &cancel).await;
        assert!(matches!(result, Err(TimelineError::CloneFailed(_))));
    }
}
