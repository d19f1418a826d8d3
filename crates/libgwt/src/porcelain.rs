use std::path::PathBuf;

use chrono::DateTime;

use crate::types::{CommitSnapshot, StaleWorktree, WorktreeRecord};

/// Date layout git uses for `%ai`.
const ISO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Prefix stripped from branch refs.
const HEADS_PREFIX: &str = "refs/heads/";

/// One block of `git worktree list --porcelain` output, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingEntry {
    /// Path from the `worktree` line.
    pub path: PathBuf,
    /// Commit hash from the `HEAD` line.
    pub head: String,
    /// Short branch name; empty when detached.
    pub branch: String,
    /// Whether a `locked` marker was present.
    pub is_locked: bool,
    /// Whether a `prunable` marker was present.
    pub is_prunable: bool,
    /// Reason text following `prunable`, if any.
    pub prune_reason: Option<String>,
}

impl ListingEntry {
    /// Convert into an unenriched record; status fields stay at their defaults.
    pub fn into_record(self) -> WorktreeRecord {
        WorktreeRecord {
            path: self.path,
            branch: self.branch,
            is_locked: self.is_locked,
            last_commit: CommitSnapshot {
                hash: self.head,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Convert into a stale-worktree description.
    pub fn into_stale(self) -> StaleWorktree {
        StaleWorktree {
            path: self.path,
            branch: self.branch,
            reason: self.prune_reason,
        }
    }

    /// Apply a single non-blank `key [value]` line to this entry.
    fn apply(&mut self, key: &str, value: Option<&str>) {
        match key {
            "HEAD" => self.head = value.unwrap_or_default().to_string(),
            "branch" => self.branch = short_branch_name(value.unwrap_or_default()),
            "locked" => self.is_locked = true,
            "prunable" => {
                self.is_prunable = true;
                self.prune_reason = value.map(str::to_string);
            }
            // `bare`, `detached` and keys added by newer git versions carry
            // nothing we track.
            _ => {}
        }
    }
}

/// Strip `refs/heads/` from a branch ref, keeping nested names intact.
fn short_branch_name(reference: &str) -> String {
    reference
        .strip_prefix(HEADS_PREFIX)
        .unwrap_or(reference)
        .to_string()
}

/// Parse `git worktree list --porcelain` output into entries, in emission order.
///
/// Entries are separated by blank lines; a `worktree` line also starts a new
/// entry. Prunable entries are returned with `is_prunable` set so callers can
/// decide whether to drop them. Blocks without a `worktree` line are skipped.
pub fn parse_worktree_list(output: &str) -> Vec<ListingEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ListingEntry> = None;

    for line in output.lines().map(str::trim) {
        if line.is_empty() {
            entries.extend(current.take());
            continue;
        }

        let (key, value) = match line.split_once(' ') {
            Some((key, value)) => (key, Some(value)),
            None => (line, None),
        };

        if key == "worktree" {
            entries.extend(current.take());
            current = Some(ListingEntry {
                path: PathBuf::from(value.unwrap_or_default()),
                ..Default::default()
            });
            continue;
        }

        current.get_or_insert_with(ListingEntry::default).apply(key, value);
    }

    entries.extend(current);
    entries.retain(|entry| !entry.path.as_os_str().is_empty());
    entries
}

/// Parse a `%H|%s|%an|%ai` line into a commit snapshot.
///
/// The subject may itself contain `|`, so the hash is taken from the front and
/// author and date from the back. Fewer than four fields yields an empty
/// snapshot; an unparsable date leaves `date` unset.
pub fn parse_commit_line(line: &str) -> CommitSnapshot {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some((hash, rest)) = line.split_once('|') else {
        return CommitSnapshot::default();
    };
    let mut tail = rest.rsplitn(3, '|');
    let (Some(date), Some(author), Some(subject)) = (tail.next(), tail.next(), tail.next()) else {
        return CommitSnapshot::default();
    };
    if hash.is_empty() {
        return CommitSnapshot::default();
    }

    CommitSnapshot {
        hash: hash.to_string(),
        subject: subject.to_string(),
        author: author.to_string(),
        date: DateTime::parse_from_str(date.trim(), ISO_DATE_FORMAT).ok(),
    }
}
