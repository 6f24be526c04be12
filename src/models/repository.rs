use super::classification::ClassifiedCommit;
use super::insights::{OnboardingNarrative, TimelineInsights};
use serde::{Deserialize, Serialize};

/// Lifecycle of a tracked repository.
///
/// `pending -> processing -> completed | error`; `error` is terminal and is
/// never retried automatically. The status column is the only synchronization
/// point a polling caller may rely on; partial commit data is never exposed
/// as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl RepoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoStatus::Pending => "pending",
            RepoStatus::Processing => "processing",
            RepoStatus::Completed => "completed",
            RepoStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<RepoStatus> {
        match value {
            "pending" => Some(RepoStatus::Pending),
            "processing" => Some(RepoStatus::Processing),
            "completed" => Some(RepoStatus::Completed),
            "error" => Some(RepoStatus::Error),
            _ => None,
        }
    }

    /// Whether moving to `next` is a legal transition. A completed
    /// repository may re-enter `processing` when it is re-ingested; `error`
    /// stays terminal.
    pub fn can_transition(&self, next: RepoStatus) -> bool {
        matches!(
            (self, next),
            (RepoStatus::Pending, RepoStatus::Processing)
                | (RepoStatus::Processing, RepoStatus::Completed)
                | (RepoStatus::Processing, RepoStatus::Error)
                | (RepoStatus::Completed, RepoStatus::Processing)
        )
    }
}

/// Repository descriptor returned by the ingestion trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    pub id: String,
    pub url: String,
    pub name: String,
    pub owner: String,
    pub status: RepoStatus,
    pub created_at: String,
}

/// Hosted-forge repository metadata, fetched once per timeline request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMeta {
    pub name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Continuation indicator for the remote listing.
///
/// `has_more` is a heuristic: true iff the returned page was exactly
/// full-size. The forge API reports no total count, so the signal can be
/// wrong at an exact page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: usize,
    pub has_more: bool,
}

/// One page of the remote timeline: repository metadata, classified commits,
/// freshly derived insights and narrative, and the continuation indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePage {
    pub repository: RepoMeta,
    pub commits: Vec<ClassifiedCommit>,
    pub insights: TimelineInsights,
    pub onboarding: OnboardingNarrative,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in [
            RepoStatus::Pending,
            RepoStatus::Processing,
            RepoStatus::Completed,
            RepoStatus::Error,
        ] {
            assert_eq!(RepoStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RepoStatus::parse("done"), None);
    }

    #[test]
    fn only_forward_transitions_are_legal() {
        assert!(RepoStatus::Pending.can_transition(RepoStatus::Processing));
        assert!(RepoStatus::Processing.can_transition(RepoStatus::Completed));
        assert!(RepoStatus::Processing.can_transition(RepoStatus::Error));
        assert!(RepoStatus::Completed.can_transition(RepoStatus::Processing));

        assert!(!RepoStatus::Pending.can_transition(RepoStatus::Completed));
        assert!(!RepoStatus::Completed.can_transition(RepoStatus::Error));
        assert!(!RepoStatus::Error.can_transition(RepoStatus::Processing));
        assert!(!RepoStatus::Error.can_transition(RepoStatus::Pending));
    }
}
