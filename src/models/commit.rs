use serde::{Deserialize, Serialize};

/// How a single file changed within a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Renamed => "renamed",
        }
    }
}

/// Per-file add/delete line counts for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub kind: ChangeKind,
}

/// Aggregate line counts for one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub additions: usize,
    pub deletions: usize,
    pub total: usize,
}

impl CommitStats {
    /// Sum file-level counts. `total` is always `additions + deletions` here.
    pub fn from_changes(changes: &[FileChange]) -> Self {
        let additions: usize = changes.iter().map(|c| c.lines_added).sum();
        let deletions: usize = changes.iter().map(|c| c.lines_deleted).sum();
        CommitStats {
            additions,
            deletions,
            total: additions + deletions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub email: String,
    /// Forge login, when the commit came through a hosting provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Author {
    /// Contributor identity key: handle when present, else display name.
    /// Never the email; the same person commits under variant emails.
    pub fn identity(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.name)
    }
}

/// One immutable change-set entry from version-control history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    /// Full hash
    pub id: String,
    /// Display-truncated hash (7 chars)
    pub short_id: String,
    /// Full multi-line message; the first line is the title
    pub message: String,
    pub author: Author,
    /// RFC 3339 timestamp as reported by the source
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub file_changes: Vec<FileChange>,
    pub stats: CommitStats,
    /// True when `stats` came from file-level detail. A false value marks a
    /// zero-filled placeholder: "no data", not "no changes".
    pub hydrated: bool,
}

impl CommitRecord {
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Truncate a full hash for display.
pub fn short_id(hash: &str) -> String {
    hash.chars().take(7).collect()
}
