//! Timeline listing contracts.
//!
//! The local path reads classified commits out of the store and projects
//! them onto the structural taxonomy; the remote path assembles one page of
//! GitHub history with freshly derived insights and narrative.

use crate::analysis::{classify, narrate, summarize, ClassifierConfig};
use crate::config::Settings;
use crate::error::{Result, TimelineError};
use crate::ingest::{GitHubClient, PageConfig};
use crate::models::{
    ClassifiedCommit, Pagination, RepoStatus, StructuralCommit, TimelinePage,
};
use crate::store::TimelineStore;

/// Classified commits for a locally ingested repository, with the five-way
/// structural category labels. Only completed ingestions are listable;
/// partial data is never exposed as if complete.
pub fn structural_timeline(
    store: &dyn TimelineStore,
    repo_id: &str,
) -> Result<Vec<StructuralCommit>> {
    let record = store
        .get(repo_id)?
        .ok_or_else(|| TimelineError::NotFound(repo_id.to_string()))?;

    if record.status != RepoStatus::Completed {
        return Err(TimelineError::NotReady {
            status: record.status.as_str(),
        });
    }

    let commits = store.list_by_repository(repo_id)?;
    Ok(commits.into_iter().map(StructuralCommit::from).collect())
}

/// One page of the remote timeline: repository metadata, classified commits,
/// recomputed insights/narrative and the continuation indicator.
pub async fn remote_timeline(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    page: u32,
    settings: &Settings,
) -> Result<TimelinePage> {
    let page = page.max(1);
    let config = PageConfig {
        per_page: settings.per_page,
        detail_limit: settings.detail_limit,
    };

    let client = client.clone();
    let owner = owner.to_string();
    let repo_name = repo.to_string();
    let (meta, records, has_more) = tokio::task::spawn_blocking(move || {
        let meta = client.fetch_repository(&owner, &repo_name)?;
        let (records, has_more) = client.fetch_page(&owner, &repo_name, page, &config)?;
        Ok::<_, TimelineError>((meta, records, has_more))
    })
    .await
    .map_err(|e| TimelineError::Http(format!("request worker failed: {e}")))??;

    let classifier = ClassifierConfig::remote();
    let commits: Vec<ClassifiedCommit> = records
        .into_iter()
        .map(|commit| {
            let paths: Vec<&str> = commit.file_changes.iter().map(|f| f.path.as_str()).collect();
            let classification = classify(&commit.message, &paths, &classifier);
            ClassifiedCommit {
                commit,
                classification,
            }
        })
        .collect();

    let insights = summarize(&commits, settings.recent_activity_limit);
    let onboarding = narrate(Some(&meta), &insights);

    Ok(TimelinePage {
        repository: meta,
        commits,
        insights,
        onboarding,
        pagination: Pagination {
            page,
            per_page: settings.per_page,
            has_more,
        },
    })
}
