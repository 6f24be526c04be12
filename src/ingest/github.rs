//! Remote ingestion via the GitHub REST API.
//!
//! Fetches repository metadata plus paged commit summaries, and hydrates a
//! bounded leading subset of each page with per-commit file detail. Detail
//! requests run concurrently and fail independently: a failed fetch degrades
//! that one commit to summary-only data, never the page.

use crate::error::{Result, TimelineError};
use crate::models::{
    commit::short_id, Author, ChangeKind, CommitRecord, CommitStats, FileChange, RepoMeta,
};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "timelens";

/// Remote paging policy. Both bounds are tunable, not hidden constants:
/// `per_page` caps the summary request, `detail_limit` caps the number of
/// secondary detail requests issued per page.
#[derive(Debug, Clone, Copy)]
pub struct PageConfig {
    pub per_page: usize,
    pub detail_limit: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            per_page: 30,
            detail_limit: 10,
        }
    }
}

/// GitHub REST client. The bearer token is optional; without one requests
/// still succeed but against a much lower rate ceiling.
#[derive(Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    token: Option<String>,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        GitHubClient {
            agent: make_agent(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Client configured from settings, which source the token from the
    /// environment.
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self::new(settings.github_token.clone())
    }

    /// Repository metadata: name, description, stars/forks, language,
    /// creation time.
    pub fn fetch_repository(&self, owner: &str, repo: &str) -> Result<RepoMeta> {
        validate_segment(owner, "owner")?;
        validate_segment(repo, "repo")?;

        let url = format!("{GITHUB_API}/repos/{owner}/{repo}");
        let api: ApiRepo = self.get_json(&url)?;
        Ok(repo_to_meta(api))
    }

    /// One page of commit records plus the continuation indicator.
    ///
    /// The first `detail_limit` commits are hydrated with file-level detail;
    /// the remainder keep zeroed stats and `hydrated: false`.
    pub fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        config: &PageConfig,
    ) -> Result<(Vec<CommitRecord>, bool)> {
        validate_segment(owner, "owner")?;
        validate_segment(repo, "repo")?;

        let url = format!(
            "{GITHUB_API}/repos/{owner}/{repo}/commits?per_page={}&page={}",
            config.per_page,
            page.max(1)
        );
        let summaries: Vec<ApiCommitSummary> = self.get_json(&url)?;
        let has_more = is_full_page(summaries.len(), config.per_page);
        debug!(
            "fetched page {page} of {owner}/{repo}: {} commits",
            summaries.len()
        );

        let mut records: Vec<CommitRecord> =
            summaries.into_iter().map(summary_to_record).collect();

        let hydrate_ids: Vec<String> = records
            .iter()
            .take(config.detail_limit)
            .map(|r| r.id.clone())
            .collect();
        let details = self.fetch_details(owner, repo, &hydrate_ids);
        merge_details(&mut records, details);

        Ok((records, has_more))
    }

    /// Issue the bounded detail batch concurrently. Results are keyed by
    /// hash so out-of-order completion and individual failures cannot be
    /// attached to the wrong commit.
    fn fetch_details(
        &self,
        owner: &str,
        repo: &str,
        shas: &[String],
    ) -> HashMap<String, ApiCommitDetail> {
        let mut details = HashMap::new();
        std::thread::scope(|scope| {
            let handles: Vec<_> = shas
                .iter()
                .map(|sha| {
                    scope.spawn(move || {
                        let url = format!("{GITHUB_API}/repos/{owner}/{repo}/commits/{sha}");
                        (sha.as_str(), self.get_json::<ApiCommitDetail>(&url))
                    })
                })
                .collect();

            for handle in handles {
                if let Ok((sha, result)) = handle.join() {
                    match result {
                        Ok(detail) => {
                            details.insert(sha.to_string(), detail);
                        }
                        Err(e) => warn!("detail fetch for {sha} failed, keeping summary: {e}"),
                    }
                }
            }
        });
        details
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request
            .call()
            .map_err(|e| TimelineError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.into_body().read_to_string().unwrap_or_default();
            return Err(classify_failure(status, api_message(&body)));
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| TimelineError::Parse(e.to_string()))
    }
}

/// Sort upstream failures into the kinds callers act on differently.
fn classify_failure(status: u16, message: String) -> TimelineError {
    let lower = message.to_lowercase();
    if status == 403 && lower.contains("rate limit") {
        return TimelineError::RateLimitExceeded { message };
    }
    if status == 403 && (lower.contains("access token") || lower.contains("not accessible")) {
        return TimelineError::TokenRestricted { status, message };
    }
    TimelineError::Upstream { status, message }
}

/// GitHub error bodies are `{"message": "..."}`; fall back to the raw text.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Continuation heuristic: a page is assumed to have a successor iff it came
/// back exactly full. Wrong only at an exact boundary: the API reports no
/// total count to check against.
fn is_full_page(count: usize, per_page: usize) -> bool {
    per_page > 0 && count == per_page
}

fn validate_segment(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() || value.contains('/') {
        return Err(TimelineError::MissingParameter(name));
    }
    Ok(())
}

fn summary_to_record(summary: ApiCommitSummary) -> CommitRecord {
    let identity = summary.commit.author.unwrap_or_default();
    CommitRecord {
        short_id: short_id(&summary.sha),
        id: summary.sha,
        message: summary.commit.message,
        author: Author {
            name: identity.name.unwrap_or_else(|| "unknown".to_string()),
            email: identity.email.unwrap_or_default(),
            handle: summary.author.as_ref().map(|u| u.login.clone()),
            avatar_url: summary.author.and_then(|u| u.avatar_url),
        },
        timestamp: identity.date.unwrap_or_default(),
        source_url: summary.html_url,
        file_changes: Vec::new(),
        stats: CommitStats::default(),
        hydrated: false,
    }
}

fn merge_details(records: &mut [CommitRecord], mut details: HashMap<String, ApiCommitDetail>) {
    for record in records.iter_mut() {
        if let Some(detail) = details.remove(&record.id) {
            apply_detail(record, detail);
        }
    }
}

fn apply_detail(record: &mut CommitRecord, detail: ApiCommitDetail) {
    record.file_changes = detail
        .files
        .unwrap_or_default()
        .into_iter()
        .map(|f| FileChange {
            path: f.filename,
            lines_added: f.additions,
            lines_deleted: f.deletions,
            kind: parse_change_kind(f.status.as_deref()),
        })
        .collect();

    record.stats = if record.file_changes.is_empty() {
        let api = detail.stats.unwrap_or_default();
        CommitStats {
            additions: api.additions,
            deletions: api.deletions,
            total: api.additions + api.deletions,
        }
    } else {
        CommitStats::from_changes(&record.file_changes)
    };
    record.hydrated = true;
}

fn parse_change_kind(status: Option<&str>) -> ChangeKind {
    match status {
        Some("added") => ChangeKind::Added,
        Some("removed") => ChangeKind::Removed,
        Some("renamed") => ChangeKind::Renamed,
        _ => ChangeKind::Modified,
    }
}

fn repo_to_meta(api: ApiRepo) -> RepoMeta {
    RepoMeta {
        name: api.name,
        full_name: api.full_name,
        description: api.description,
        stars: api.stargazers_count,
        forks: api.forks_count,
        language: api.language,
        created_at: api.created_at,
        html_url: api.html_url,
        owner_handle: api.owner.as_ref().map(|u| u.login.clone()),
        avatar_url: api.owner.and_then(|u| u.avatar_url),
    }
}

// Wire shapes, deserialization only.

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    created_at: Option<String>,
    html_url: Option<String>,
    owner: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitSummary {
    sha: String,
    html_url: Option<String>,
    commit: ApiCommitBody,
    author: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitBody {
    message: String,
    author: Option<ApiIdentity>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiIdentity {
    name: Option<String>,
    email: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[allow(dead_code)]
    sha: String,
    stats: Option<ApiStats>,
    files: Option<Vec<ApiFile>>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiStats {
    #[serde(default)]
    additions: usize,
    #[serde(default)]
    deletions: usize,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    filename: String,
    #[serde(default)]
    additions: usize,
    #[serde(default)]
    deletions: usize,
    status: Option<String>,
}
