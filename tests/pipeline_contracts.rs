use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use timelens::api::{
    register_repository, repository_status, spawn_ingestion, structural_timeline,
};
use timelens::models::{RepoRecord, RepoStatus};
use timelens::store::{SqliteStore, TimelineStore};
use timelens::{Settings, TimelineError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_and_stage(repo: &Repository, workdir: &Path, files: &[(&str, &str)]) {
    let mut index = repo.index().expect("open index");
    for (path, content) in files {
        let absolute = workdir.join(path);
        fs::create_dir_all(absolute.parent().expect("parent")).expect("create dirs");
        fs::write(&absolute, content).expect("write file");
        index.add_path(Path::new(path)).expect("stage file");
    }
    index.write().expect("write index");
}

fn commit_files(repo: &Repository, workdir: &Path, files: &[(&str, &str)], message: &str) {
    write_and_stage(repo, workdir, files);

    let mut index = repo.index().expect("open index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let signature = Signature::now("Test User", "test@example.com").expect("signature");

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("commit");
}

/// Build a source repository with a realistic little history.
fn create_source_repo() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("init git repo");

    commit_files(
        &repo,
        temp_dir.path(),
        &[("README.md", "# timeline\n")],
        "Initial commit",
    );
    commit_files(
        &repo,
        temp_dir.path(),
        &[
            ("src/timeline.rs", "pub fn render() {}\n"),
            ("src/lib.rs", "pub mod timeline;\n"),
        ],
        "feat: add timeline view",
    );
    commit_files(
        &repo,
        temp_dir.path(),
        &[("src/timeline.rs", "pub fn render() { /* offset */ }\n")],
        "fix: broken scroll offset",
    );

    let path = temp_dir.path().to_string_lossy().to_string();
    (temp_dir, path)
}

/// Register a record whose URL points at a local fixture so the clone stage
/// runs against it.
fn register_fixture(store: &SqliteStore, source: &str) -> RepoRecord {
    let record = RepoRecord {
        id: uuid::Uuid::new_v4().to_string(),
        url: source.to_string(),
        name: "fixture".to_string(),
        owner: "local".to_string(),
        status: RepoStatus::Pending,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    store.create(&record).expect("create fixture record");
    record
}

#[tokio::test]
async fn local_ingestion_classifies_commits_and_completes() {
    init_logging();
    let (_src, source) = create_source_repo();
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    let record = register_fixture(&store, &source);

    let handle = spawn_ingestion(store.clone(), &record, Settings::default());
    handle.wait().await;

    assert_eq!(
        repository_status(store.as_ref(), &record.id).expect("status"),
        RepoStatus::Completed
    );

    let commits = structural_timeline(store.as_ref(), &record.id).expect("timeline");
    assert_eq!(commits.len(), 3);

    // Most-recent-first, with the structural five-way labels.
    assert_eq!(commits[0].commit.title(), "fix: broken scroll offset");
    assert_eq!(commits[0].category, "bug-fix");
    assert_eq!(commits[1].commit.title(), "feat: add timeline view");
    assert_eq!(commits[1].category, "major-feature");
    assert_eq!(commits[2].commit.title(), "Initial commit");
    assert_eq!(commits[2].category, "architecture");

    for commit in &commits {
        assert!(commit.commit.hydrated);
        assert_eq!(
            commit.commit.stats.total,
            commit.commit.stats.additions + commit.commit.stats.deletions
        );
        assert!(!commit.tags.is_empty());
    }
    assert_eq!(commits[1].commit.file_changes.len(), 2);
}

#[tokio::test]
async fn malformed_urls_are_rejected_before_any_work_starts() {
    let store = SqliteStore::open_in_memory().expect("store");

    let result = register_repository(&store, "git@github.com:acme/timeline.git");
    assert!(matches!(result, Err(TimelineError::InvalidUrl(_))));

    let result = register_repository(&store, "https://github.com/acme");
    assert!(matches!(result, Err(TimelineError::InvalidUrl(_))));
}

#[tokio::test]
async fn failed_acquisition_surfaces_only_through_the_status_field() {
    init_logging();
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    let record = register_fixture(&store, "/definitely/not/a/repo");

    let handle = spawn_ingestion(store.clone(), &record, Settings::default());
    handle.wait().await;

    assert_eq!(
        repository_status(store.as_ref(), &record.id).expect("status"),
        RepoStatus::Error
    );

    // The failed pass left no listable partial data.
    let result = structural_timeline(store.as_ref(), &record.id);
    assert!(matches!(result, Err(TimelineError::NotReady { .. })));
}

#[tokio::test]
async fn cancellation_aborts_the_pass_and_records_an_error() {
    init_logging();
    let (_src, source) = create_source_repo();
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    let record = register_fixture(&store, &source);

    let handle = spawn_ingestion(store.clone(), &record, Settings::default());
    handle.cancel();
    handle.wait().await;

    assert_eq!(
        repository_status(store.as_ref(), &record.id).expect("status"),
        RepoStatus::Error
    );
}

#[tokio::test]
async fn reingestion_replaces_the_commit_set() {
    init_logging();
    let (src, source) = create_source_repo();
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    let record = register_fixture(&store, &source);

    let handle = spawn_ingestion(store.clone(), &record, Settings::default());
    handle.wait().await;
    assert_eq!(
        structural_timeline(store.as_ref(), &record.id)
            .expect("first timeline")
            .len(),
        3
    );

    let repo = Repository::open(src.path()).expect("reopen fixture");
    commit_files(
        &repo,
        src.path(),
        &[("docs/guide.md", "# guide\n")],
        "docs: add onboarding guide",
    );

    let handle = spawn_ingestion(store.clone(), &record, Settings::default());
    handle.wait().await;

    let commits = structural_timeline(store.as_ref(), &record.id).expect("second timeline");
    assert_eq!(commits.len(), 4);
    assert_eq!(commits[0].commit.title(), "docs: add onboarding guide");
}
