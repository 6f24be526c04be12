use super::TimelineStore;
use crate::error::{Result, TimelineError};
use crate::models::{
    Author, Category, ChangeKind, Classification, ClassifiedCommit, CommitRecord, CommitStats,
    FileChange, Importance, RepoRecord, RepoStatus,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const DB_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed store. All access goes through one mutex-guarded
/// connection, which serializes writes across repositories.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        initialize_schema(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means a previous writer panicked mid-statement;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; keep reads working for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS repositories (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            owner TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK(status IN ('pending', 'processing', 'completed', 'error')),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS commits (
            repo_id TEXT NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            short_id TEXT NOT NULL,
            message TEXT NOT NULL,
            author_name TEXT NOT NULL,
            author_email TEXT NOT NULL DEFAULT '',
            author_handle TEXT,
            avatar_url TEXT,
            timestamp TEXT NOT NULL,
            source_url TEXT,
            additions INTEGER NOT NULL DEFAULT 0,
            deletions INTEGER NOT NULL DEFAULT 0,
            total INTEGER NOT NULL DEFAULT 0,
            hydrated INTEGER NOT NULL DEFAULT 0,
            category TEXT NOT NULL,
            importance TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            file_changes TEXT NOT NULL DEFAULT '[]',
            position INTEGER NOT NULL,
            PRIMARY KEY (repo_id, id)
        );

        CREATE INDEX IF NOT EXISTS idx_commits_repo_position ON commits(repo_id, position);
        ",
    )
}

impl TimelineStore for SqliteStore {
    fn get(&self, id: &str) -> Result<Option<RepoRecord>> {
        let conn = self.lock();
        let record = conn
            .query_row(
                "SELECT id, url, name, owner, status, created_at FROM repositories WHERE id = ?1",
                params![id],
                row_to_repo,
            )
            .optional()?;
        Ok(record)
    }

    fn get_by_url(&self, url: &str) -> Result<Option<RepoRecord>> {
        let conn = self.lock();
        let record = conn
            .query_row(
                "SELECT id, url, name, owner, status, created_at FROM repositories WHERE url = ?1",
                params![url],
                row_to_repo,
            )
            .optional()?;
        Ok(record)
    }

    fn create(&self, record: &RepoRecord) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO repositories (id, url, name, owner, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.url,
                record.name,
                record.owner,
                record.status.as_str(),
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn update_status(&self, id: &str, status: RepoStatus) -> Result<()> {
        let conn = self.lock();
        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM repositories WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let current = current
            .as_deref()
            .and_then(RepoStatus::parse)
            .ok_or_else(|| TimelineError::NotFound(id.to_string()))?;

        if !current.can_transition(status) {
            return Err(TimelineError::InvalidTransition {
                from: current.as_str(),
                to: status.as_str(),
            });
        }

        conn.execute(
            "UPDATE repositories SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(())
    }

    fn list_by_repository(&self, repo_id: &str) -> Result<Vec<ClassifiedCommit>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, short_id, message, author_name, author_email, author_handle, avatar_url,
                    timestamp, source_url, additions, deletions, total, hydrated, category,
                    importance, tags, file_changes
             FROM commits WHERE repo_id = ?1 ORDER BY position ASC",
        )?;

        let commits = stmt
            .query_map(params![repo_id], row_to_commit)?
            .collect::<rusqlite::Result<Vec<ClassifiedCommit>>>()?;
        Ok(commits)
    }

    fn replace_commits(&self, repo_id: &str, commits: &[ClassifiedCommit]) -> Result<()> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM commits WHERE repo_id = ?1", params![repo_id])?;

        for (position, classified) in commits.iter().enumerate() {
            let commit = &classified.commit;
            let tags = serde_json::to_string(&classified.classification.tags)?;
            let file_changes = serde_json::to_string(&commit.file_changes)?;

            tx.execute(
                "INSERT INTO commits (
                    repo_id, id, short_id, message, author_name, author_email, author_handle,
                    avatar_url, timestamp, source_url, additions, deletions, total, hydrated,
                    category, importance, tags, file_changes, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    repo_id,
                    commit.id,
                    commit.short_id,
                    commit.message,
                    commit.author.name,
                    commit.author.email,
                    commit.author.handle,
                    commit.author.avatar_url,
                    commit.timestamp,
                    commit.source_url,
                    commit.stats.additions as i64,
                    commit.stats.deletions as i64,
                    commit.stats.total as i64,
                    commit.hydrated as i64,
                    classified.classification.category.as_str(),
                    classified.classification.importance.as_str(),
                    tags,
                    file_changes,
                    position as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_by_repository(&self, repo_id: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM commits WHERE repo_id = ?1", params![repo_id])?;
        Ok(())
    }
}

fn row_to_repo(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepoRecord> {
    let status: String = row.get(4)?;
    Ok(RepoRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        owner: row.get(3)?,
        status: RepoStatus::parse(&status).unwrap_or(RepoStatus::Error),
        created_at: row.get(5)?,
    })
}

fn row_to_commit(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassifiedCommit> {
    let tags_json: String = row.get(15)?;
    let changes_json: String = row.get(16)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let file_changes: Vec<FileChange> = serde_json::from_str(&changes_json).unwrap_or_default();

    let category: String = row.get(13)?;
    let importance: String = row.get(14)?;

    Ok(ClassifiedCommit {
        commit: CommitRecord {
            id: row.get(0)?,
            short_id: row.get(1)?,
            message: row.get(2)?,
            author: Author {
                name: row.get(3)?,
                email: row.get(4)?,
                handle: row.get(5)?,
                avatar_url: row.get(6)?,
            },
            timestamp: row.get(7)?,
            source_url: row.get(8)?,
            stats: CommitStats {
                additions: row.get::<_, i64>(9)? as usize,
                deletions: row.get::<_, i64>(10)? as usize,
                total: row.get::<_, i64>(11)? as usize,
            },
            hydrated: row.get::<_, i64>(12)? != 0,
            file_changes,
        },
        classification: Classification {
            category: Category::parse(&category).unwrap_or(Category::Feature),
            importance: Importance::parse(&importance).unwrap_or(Importance::Low),
            tags,
        },
    })
}

/// Whether a create failed because the URL is already registered.
pub fn is_unique_violation(error: &TimelineError) -> bool {
    match error {
        TimelineError::Store(rusqlite::Error::SqliteFailure(e, _)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
        }
        _ => false,
    }
}
