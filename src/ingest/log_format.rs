//! Parser for the `git log --pretty=format:%H|%s|%an|%ae|%aI --numstat`
//! text format.
//!
//! Each commit is one pipe-separated header line (hash, subject, author
//! name, author email, ISO date) followed by zero or more tab-separated
//! numstat lines (`insertions<TAB>deletions<TAB>path`) until the next header
//! or end of input.

use crate::models::{
    commit::short_id, Author, ChangeKind, CommitRecord, CommitStats, FileChange,
};

/// Parse full log output into commit records, preserving log order
/// (most-recent-first as git emits it).
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    let mut commits: Vec<CommitRecord> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(record) = parse_header(line) {
            commits.push(record);
            continue;
        }

        if let Some(change) = parse_numstat(line) {
            // A numstat line before any header has nothing to attach to.
            if let Some(current) = commits.last_mut() {
                current.file_changes.push(change);
            }
        }
    }

    for commit in &mut commits {
        commit.stats = CommitStats::from_changes(&commit.file_changes);
    }

    commits
}

/// A header line carries exactly five fields, but the subject itself may
/// contain the separator. The hash is the first field and date/email/name
/// are the last three; everything between is the subject.
fn parse_header(line: &str) -> Option<CommitRecord> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 5 {
        return None;
    }

    let hash = parts[0].trim();
    if !is_hash(hash) {
        return None;
    }

    let len = parts.len();
    let timestamp = parts[len - 1].trim().to_string();
    let email = parts[len - 2].trim().to_string();
    let name = parts[len - 3].trim().to_string();
    let subject = parts[1..len - 3].join("|");

    Some(CommitRecord {
        id: hash.to_string(),
        short_id: short_id(hash),
        message: subject,
        author: Author {
            name,
            email,
            handle: None,
            avatar_url: None,
        },
        timestamp,
        source_url: None,
        file_changes: Vec::new(),
        stats: CommitStats::default(),
        // Locally extracted commits always carry file-level detail; an empty
        // change list here means a genuinely empty commit, not missing data.
        hydrated: true,
    })
}

fn parse_numstat(line: &str) -> Option<FileChange> {
    let mut fields = line.splitn(3, '\t');
    let lines_added = count_field(fields.next()?)?;
    let lines_deleted = count_field(fields.next()?)?;
    let raw_path = fields.next()?.trim();
    if raw_path.is_empty() {
        return None;
    }

    let (path, renamed) = resolve_rename(raw_path);
    Some(FileChange {
        path,
        lines_added,
        lines_deleted,
        kind: if renamed {
            ChangeKind::Renamed
        } else {
            ChangeKind::Modified
        },
    })
}

/// Numstat reports `-` for binary files; treat it as 0, never a parse error.
fn count_field(field: &str) -> Option<usize> {
    let field = field.trim();
    if field == "-" {
        return Some(0);
    }
    field.parse().ok()
}

/// Collapse numstat rename notation to the new path:
/// `old => new` and `dir/{old => new}/rest` both resolve to the destination.
fn resolve_rename(raw: &str) -> (String, bool) {
    if let (Some(open), Some(close)) = (raw.find('{'), raw.find('}')) {
        if open < close {
            let inner = &raw[open + 1..close];
            if let Some((_, new_part)) = inner.split_once(" => ") {
                let mut path = String::new();
                path.push_str(&raw[..open]);
                path.push_str(new_part);
                path.push_str(&raw[close + 1..]);
                return (path.replace("//", "/"), true);
            }
        }
    }
    if let Some((_, new_path)) = raw.split_once(" => ") {
        return (new_path.to_string(), true);
    }
    (raw.to_string(), false)
}

fn is_hash(value: &str) -> bool {
    value.len() >= 7 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn parses_a_commit_with_numstat_lines() {
        let output = format!(
            "{HASH_A}|feat: add timeline|Alice|alice@example.com|2024-01-05T10:00:00+00:00\n\
             10\t2\tsrc/timeline.rs\n\
             3\t0\tsrc/lib.rs\n"
        );

        let commits = parse_log(&output);
        assert_eq!(commits.len(), 1);

        let commit = &commits[0];
        assert_eq!(commit.id, HASH_A);
        assert_eq!(commit.short_id, "aaaaaaa");
        assert_eq!(commit.message, "feat: add timeline");
        assert_eq!(commit.author.name, "Alice");
        assert_eq!(commit.author.email, "alice@example.com");
        assert_eq!(commit.file_changes.len(), 2);
        assert_eq!(commit.stats.additions, 13);
        assert_eq!(commit.stats.deletions, 2);
        assert_eq!(commit.stats.total, 15);
        assert!(commit.hydrated);
    }

    #[test]
    fn binary_numstat_counts_parse_as_zero() {
        let change = parse_numstat("-\t5\tbinary.png").expect("numstat line");
        assert_eq!(change.lines_added, 0);
        assert_eq!(change.lines_deleted, 5);
        assert_eq!(change.path, "binary.png");
    }

    #[test]
    fn subject_containing_the_separator_is_reassembled() {
        let line = format!("{HASH_A}|fix: a | b | c|Alice|alice@example.com|2024-01-05T10:00:00Z");
        let commit = parse_header(&line).expect("header line");
        assert_eq!(commit.message, "fix: a | b | c");
        assert_eq!(commit.author.name, "Alice");
        assert_eq!(commit.timestamp, "2024-01-05T10:00:00Z");
    }

    #[test]
    fn empty_commit_yields_record_with_no_file_changes() {
        let output = format!(
            "{HASH_A}|empty release marker|Bob|bob@example.com|2024-01-06T10:00:00Z\n\
             {HASH_B}|feat: real work|Bob|bob@example.com|2024-01-05T10:00:00Z\n\
             1\t1\tsrc/lib.rs\n"
        );

        let commits = parse_log(&output);
        assert_eq!(commits.len(), 2);
        assert!(commits[0].file_changes.is_empty());
        assert_eq!(commits[0].stats, CommitStats::default());
        assert!(commits[0].hydrated);
        assert_eq!(commits[1].file_changes.len(), 1);
    }

    #[test]
    fn rename_paths_resolve_to_the_destination() {
        let braced = parse_numstat("4\t1\tsrc/{old => new}/mod.rs").expect("braced rename");
        assert_eq!(braced.path, "src/new/mod.rs");
        assert_eq!(braced.kind, ChangeKind::Renamed);

        let plain = parse_numstat("0\t0\told.rs => new.rs").expect("plain rename");
        assert_eq!(plain.path, "new.rs");
        assert_eq!(plain.kind, ChangeKind::Renamed);
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let output = format!(
            "not a header line\n\
             {HASH_A}|feat: ok|Alice|alice@example.com|2024-01-05T10:00:00Z\n\
             totally\tbroken\n"
        );
        let commits = parse_log(&output);
        assert_eq!(commits.len(), 1);
        assert!(commits[0].file_changes.is_empty());
    }

    #[test]
    fn log_order_is_preserved() {
        let output = format!(
            "{HASH_A}|second|A|a@e.com|2024-01-02T00:00:00Z\n\
             {HASH_B}|first|A|a@e.com|2024-01-01T00:00:00Z\n"
        );
        let commits = parse_log(&output);
        assert_eq!(commits[0].message, "second");
        assert_eq!(commits[1].message, "first");
    }
}
