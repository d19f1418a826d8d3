use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Last commit on a worktree's HEAD at enumeration time.
///
/// The default value (empty hash) means "no commit information", either
/// because the branch has no commits yet or because git's answer could not
/// be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSnapshot {
    /// Full commit hash.
    pub hash: String,
    /// Subject line of the commit message.
    pub subject: String,
    /// Author name.
    pub author: String,
    /// Author date, when git reported one in ISO form.
    pub date: Option<DateTime<FixedOffset>>,
}

impl CommitSnapshot {
    /// Whether this snapshot carries no commit.
    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    /// Abbreviated hash for display, at most seven characters.
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(7) {
            Some((idx, _)) => &self.hash[..idx],
            None => &self.hash,
        }
    }
}

/// One worktree as reported by an enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorktreeRecord {
    /// Filesystem path where the worktree is checked out.
    pub path: PathBuf,
    /// Branch name without the `refs/heads/` prefix; empty when detached.
    pub branch: String,
    /// Whether this is the repository's original checkout.
    pub is_main: bool,
    /// Whether git has the worktree locked.
    pub is_locked: bool,
    /// Whether the worktree has uncommitted changes.
    pub is_dirty: bool,
    /// Creation time of the worktree directory, when the filesystem reports it.
    pub created_at: Option<DateTime<Utc>>,
    /// Commit currently checked out.
    pub last_commit: CommitSnapshot,
}

impl WorktreeRecord {
    /// Whether the worktree is checked out to a commit rather than a branch.
    pub fn is_detached(&self) -> bool {
        self.branch.is_empty()
    }

    /// Single-word status, in precedence order locked > dirty > main > clean.
    pub fn status_label(&self) -> &'static str {
        if self.is_locked {
            "locked"
        } else if self.is_dirty {
            "dirty"
        } else if self.is_main {
            "main"
        } else {
            "clean"
        }
    }
}

/// Parameters for adding a worktree.
#[derive(Debug, Clone, Default)]
pub struct WorktreeCreationRequest {
    /// Branch to check out (or create).
    pub branch: String,
    /// Directory for the new worktree.
    pub path: PathBuf,
    /// Start point for a newly created branch.
    pub base_branch: Option<String>,
    /// Whether `branch` must be created with `-b`.
    pub create_branch: bool,
    /// Pass `--force` to git, allowing a non-empty target.
    pub force: bool,
}

/// A listing entry git flags as `prunable`; its directory is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleWorktree {
    /// Recorded worktree path.
    pub path: PathBuf,
    /// Branch that was checked out, empty when detached.
    pub branch: String,
    /// Reason text git attached to the marker, if any.
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_label_precedence() {
        let mut record = WorktreeRecord {
            is_main: true,
            ..Default::default()
        };
        assert_eq!(record.status_label(), "main");
        record.is_dirty = true;
        assert_eq!(record.status_label(), "dirty");
        record.is_locked = true;
        assert_eq!(record.status_label(), "locked");

        let linked = WorktreeRecord::default();
        assert_eq!(linked.status_label(), "clean");
    }

    #[test]
    fn short_hash_handles_short_input() {
        let commit = CommitSnapshot {
            hash: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        assert_eq!(commit.short_hash(), "0123456");
        assert!(!commit.is_empty());

        let short = CommitSnapshot {
            hash: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(short.short_hash(), "abc");
        assert!(CommitSnapshot::default().is_empty());
    }

    #[test]
    fn detached_means_empty_branch() {
        let record = WorktreeRecord::default();
        assert!(record.is_detached());
    }

    #[test]
    fn record_serializes_with_field_names() {
        let record = WorktreeRecord {
            path: PathBuf::from("/work/repo"),
            branch: "main".to_string(),
            is_main: true,
            last_commit: CommitSnapshot {
                hash: "abc".to_string(),
                subject: "Initial commit".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["path"], "/work/repo");
        assert_eq!(value["branch"], "main");
        assert_eq!(value["is_main"], true);
        assert_eq!(value["created_at"], serde_json::Value::Null);
        assert_eq!(value["last_commit"]["subject"], "Initial commit");
        assert_eq!(value["last_commit"]["date"], serde_json::Value::Null);
    }
}
