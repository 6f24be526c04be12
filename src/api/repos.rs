//! Repository registration and background ingestion.
//!
//! The trigger returns a pending descriptor immediately; ingestion runs as a
//! detached task that owns the store handle and reports progress only
//! through the status column. Callers cancel via the handle's token (e.g. on
//! client disconnect); cancellation propagates into in-flight subprocesses.

use crate::analysis::{classify, ClassifierConfig};
use crate::config::Settings;
use crate::error::{Result, TimelineError};
use crate::ingest::local;
use crate::models::{ClassifiedCommit, RepoRecord, RepoStatus};
use crate::store::sqlite::is_unique_violation;
use crate::store::TimelineStore;
use log::{info, warn};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// `https://<host>/<owner>/<repo>`, optionally `.git`-suffixed.
fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://[^/\s]+/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
            .expect("static url pattern")
    })
}

/// Extract (owner, repo name) from a repository URL, rejecting anything that
/// does not match the expected shape.
pub fn parse_repo_url(url: &str) -> Result<(String, String)> {
    let captures = url_pattern()
        .captures(url.trim())
        .ok_or_else(|| TimelineError::InvalidUrl(url.to_string()))?;
    Ok((captures[1].to_string(), captures[2].to_string()))
}

/// Validate the URL and create a pending repository record. Registering an
/// already-known URL returns the existing record; the uniqueness constraint
/// makes the check-then-create race-free even across concurrent callers.
pub fn register_repository(store: &dyn TimelineStore, url: &str) -> Result<RepoRecord> {
    let url = url.trim();
    let (owner, name) = parse_repo_url(url)?;

    if let Some(existing) = store.get_by_url(url)? {
        return Ok(existing);
    }

    let record = RepoRecord {
        id: uuid::Uuid::new_v4().to_string(),
        url: url.to_string(),
        name,
        owner,
        status: RepoStatus::Pending,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    match store.create(&record) {
        Ok(()) => Ok(record),
        // Lost the race to a concurrent registration; surface the winner.
        Err(e) if is_unique_violation(&e) => store
            .get_by_url(url)?
            .ok_or(e),
        Err(e) => Err(e),
    }
}

/// Status for a polling caller: "still working" vs "done" vs "failed",
/// without exposing partial data.
pub fn repository_status(store: &dyn TimelineStore, id: &str) -> Result<RepoStatus> {
    store
        .get(id)?
        .map(|record| record.status)
        .ok_or_else(|| TimelineError::NotFound(id.to_string()))
}

/// Handle to a detached ingestion pass.
pub struct IngestionHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl IngestionHandle {
    /// Request cancellation of the in-flight pass.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the pass to finish. Only the status column reports the
    /// outcome.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Start a fire-and-forget ingestion pass for a registered repository.
pub fn spawn_ingestion(
    store: Arc<dyn TimelineStore>,
    record: &RepoRecord,
    settings: Settings,
) -> IngestionHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let repo_id = record.id.clone();
    let url = record.url.clone();

    let task = tokio::spawn(async move {
        if let Err(e) = run_ingestion(store.as_ref(), &repo_id, &url, &settings, &token).await {
            warn!("ingestion for {url} failed: {e}");
            if let Err(status_err) = store.update_status(&repo_id, RepoStatus::Error) {
                warn!("could not record error status for {repo_id}: {status_err}");
            }
        }
    });

    IngestionHandle { cancel, task }
}

async fn run_ingestion(
    store: &dyn TimelineStore,
    repo_id: &str,
    url: &str,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<()> {
    store.update_status(repo_id, RepoStatus::Processing)?;

    let raw = local::ingest(url, settings, cancel).await?;

    let config = ClassifierConfig::local();
    let classified: Vec<ClassifiedCommit> = raw
        .into_iter()
        .map(|commit| {
            let paths: Vec<&str> = commit.file_changes.iter().map(|f| f.path.as_str()).collect();
            let classification = classify(&commit.message, &paths, &config);
            ClassifiedCommit {
                commit,
                classification,
            }
        })
        .collect();

    store.replace_commits(repo_id, &classified)?;
    store.update_status(repo_id, RepoStatus::Completed)?;
    info!(
        "ingestion completed for {url}: {} classified commits",
        classified.len()
    );
    Ok(())
}
