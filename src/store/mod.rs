pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{ClassifiedCommit, RepoRecord, RepoStatus};

/// Storage contract for repositories and their classified commit sets.
///
/// Writes are serialized per store; `create` is atomic with respect to the
/// URL uniqueness check, so concurrent registrations of the same URL cannot
/// race into duplicate records.
pub trait TimelineStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<RepoRecord>>;

    fn get_by_url(&self, url: &str) -> Result<Option<RepoRecord>>;

    fn create(&self, record: &RepoRecord) -> Result<()>;

    /// Apply a status transition. Illegal transitions (anything outside
    /// pending -> processing -> completed | error) are rejected.
    fn update_status(&self, id: &str, status: RepoStatus) -> Result<()>;

    /// Classified commits for one repository, in ingestion order.
    fn list_by_repository(&self, repo_id: &str) -> Result<Vec<ClassifiedCommit>>;

    /// Atomically replace the commit set for one repository. Re-ingestion
    /// replaces, never mutates.
    fn replace_commits(&self, repo_id: &str, commits: &[ClassifiedCommit]) -> Result<()>;

    fn delete_by_repository(&self, repo_id: &str) -> Result<()>;
}
