//! Pipeline settings.
//!
//! Every bound the ingestion paths rely on is a tunable here, loaded from an
//! optional JSON file over defaults with defensive clamping. The GitHub
//! bearer token comes from the `GITHUB_TOKEN` environment variable (or the
//! settings file); its absence only lowers the request-rate ceiling.

use serde_json::Value;
use std::path::Path;

/// Effective pipeline settings after defaulting and clamping.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shallow-clone depth for local ingestion
    pub clone_depth: u32,
    /// Most-recent non-merge commits extracted per local pass
    pub max_commits: usize,
    pub clone_timeout_secs: u64,
    pub log_timeout_secs: u64,
    /// Commit summaries per remote page
    pub per_page: usize,
    /// Leading commits per page hydrated with file-level detail
    pub detail_limit: usize,
    /// Entries in the recent-activity strip
    pub recent_activity_limit: usize,
    pub github_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            clone_depth: 50,
            max_commits: 100,
            clone_timeout_secs: 60,
            log_timeout_secs: 30,
            per_page: 30,
            detail_limit: 10,
            recent_activity_limit: 5,
            github_token: None,
        }
    }
}

impl Settings {
    /// Defaults plus the ambient `GITHUB_TOKEN`, no settings file.
    pub fn from_env() -> Self {
        Settings {
            github_token: env_token(),
            ..Settings::default()
        }
    }

    /// Load from a JSON settings file, falling back to defaults for missing
    /// or out-of-range keys. A missing or unreadable file is not an error.
    pub fn load(path: &Path) -> Self {
        let raw = std::fs::read_to_string(path).unwrap_or_default();
        let parsed: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
        Settings::from_value(&parsed)
    }

    fn from_value(value: &Value) -> Self {
        let defaults = Settings::default();
        let file_token = value
            .get("githubToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Settings {
            clone_depth: clamp_u64(value, "cloneDepth", 1, 200, defaults.clone_depth as u64)
                as u32,
            max_commits: clamp_u64(value, "maxCommits", 20, 100, defaults.max_commits as u64)
                as usize,
            clone_timeout_secs: clamp_u64(
                value,
                "cloneTimeoutSecs",
                5,
                600,
                defaults.clone_timeout_secs,
            ),
            log_timeout_secs: clamp_u64(
                value,
                "logTimeoutSecs",
                5,
                600,
                defaults.log_timeout_secs,
            ),
            per_page: clamp_u64(value, "perPage", 1, 100, defaults.per_page as u64) as usize,
            detail_limit: clamp_u64(value, "detailLimit", 0, 30, defaults.detail_limit as u64)
                as usize,
            recent_activity_limit: clamp_u64(
                value,
                "recentActivityLimit",
                1,
                50,
                defaults.recent_activity_limit as u64,
            ) as usize,
            // The environment wins over the file so deployments can rotate
            // tokens without touching settings.
            github_token: env_token().or(file_token),
        }
    }
}

fn env_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
}

fn clamp_u64(value: &Value, key: &str, min: u64, max: u64, default: u64) -> u64 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .unwrap_or(default)
        .clamp(min, max)
}
