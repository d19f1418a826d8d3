use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    git::Git,
    porcelain::{ListingEntry, parse_commit_line, parse_worktree_list},
    repository::RepositoryHandle,
    types::{CommitSnapshot, StaleWorktree, WorktreeCreationRequest, WorktreeRecord},
};

/// Enumerates and mutates the worktrees of one repository through git.
///
/// Every call re-reads state from git; nothing is cached between calls.
/// Mutating operations must not run concurrently against the same
/// repository, since git's own lock file is the only arbitration.
#[derive(Debug, Clone)]
pub struct WorktreeStore {
    /// The repository whose worktrees are managed.
    repo: RepositoryHandle,
    /// Git executable used for every invocation.
    git: Git,
}

impl WorktreeStore {
    /// Create a store for `repo`, invoking the git program named in `config`.
    pub fn new(repo: RepositoryHandle, config: &Config) -> Self {
        Self {
            repo,
            git: Git::new(config.git.program.clone()),
        }
    }

    /// The repository this store operates on.
    pub fn repository(&self) -> &RepositoryHandle {
        &self.repo
    }

    /// Raw listing entries in emission order, prunable ones included.
    fn listing(&self) -> Result<Vec<ListingEntry>> {
        let output = self.git.worktree_list_porcelain(self.repo.root())?;
        Ok(parse_worktree_list(&output))
    }

    /// List all worktrees with derived status, in the order git reports them.
    ///
    /// Entries git marks `prunable` are dropped. Each remaining record is
    /// enriched with its main/dirty state, last commit, and creation time;
    /// failures during enrichment degrade to defaults rather than errors.
    pub fn enumerate(&self) -> Result<Vec<WorktreeRecord>> {
        let records = self
            .listing()?
            .into_iter()
            .filter(|entry| {
                if entry.is_prunable {
                    debug!(path = %entry.path.display(), "skipping prunable worktree");
                }
                !entry.is_prunable
            })
            .map(|entry| self.enrich(entry.into_record()))
            .collect();
        Ok(records)
    }

    /// Entries git reports as `prunable`: their directories no longer exist.
    pub fn stale(&self) -> Result<Vec<StaleWorktree>> {
        Ok(self
            .listing()?
            .into_iter()
            .filter(|entry| entry.is_prunable)
            .map(ListingEntry::into_stale)
            .collect())
    }

    /// Fill in the derived fields of a freshly parsed record.
    fn enrich(&self, mut record: WorktreeRecord) -> WorktreeRecord {
        record.is_main = is_main_worktree(&record.path);
        record.is_dirty = self.is_dirty(&record.path);
        record.created_at = created_at(&record.path);
        record.last_commit = self.last_commit(&record.path);
        record
    }

    /// Whether `git status --porcelain` in `path` reports anything.
    fn is_dirty(&self, path: &Path) -> bool {
        self.git
            .has_uncommitted_changes(path)
            .unwrap_or_else(|err| {
                debug!(path = %path.display(), %err, "status check failed, treating as clean");
                false
            })
    }

    /// Last commit in `path`; empty when git fails or the line is malformed.
    fn last_commit(&self, path: &Path) -> CommitSnapshot {
        match self.git.last_commit_line(path) {
            Ok(line) => {
                let commit = parse_commit_line(&line);
                if commit.is_empty() {
                    debug!(path = %path.display(), %line, "unparsable commit line");
                }
                commit
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "no commit information");
                CommitSnapshot::default()
            }
        }
    }

    /// Whether a local branch named exactly `name` exists.
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        self.git.has_branch(self.repo.root(), name)
    }

    /// Add a worktree.
    ///
    /// The returned record reflects the request only; status fields are not
    /// queried back from git.
    pub fn create(&self, request: &WorktreeCreationRequest) -> Result<WorktreeRecord> {
        self.git.add_worktree(self.repo.root(), request)?;
        info!(
            branch = %request.branch,
            path = %request.path.display(),
            created_branch = request.create_branch,
            "created worktree"
        );
        Ok(WorktreeRecord {
            path: request.path.clone(),
            branch: request.branch.clone(),
            ..Default::default()
        })
    }

    /// Remove the worktree at exactly `path`.
    pub fn remove(&self, path: &Path) -> Result<()> {
        self.git.remove_worktree(self.repo.root(), path)?;
        info!(path = %path.display(), "removed worktree");
        Ok(())
    }

    /// Unlock the worktree at `path` so it can be removed or pruned.
    pub fn unlock(&self, path: &Path) -> Result<()> {
        self.git.unlock_worktree(self.repo.root(), path)?;
        info!(path = %path.display(), "unlocked worktree");
        Ok(())
    }

    /// Prune administrative records of every stale worktree.
    pub fn prune(&self) -> Result<()> {
        self.git.prune_worktrees(self.repo.root())?;
        info!(root = %self.repo.root().display(), "pruned worktrees");
        Ok(())
    }
}

/// The main worktree holds a real `.git` directory; linked ones hold a pointer file.
fn is_main_worktree(path: &Path) -> bool {
    fs::metadata(path.join(".git")).is_ok_and(|meta| meta.is_dir())
}

/// Filesystem creation time of the worktree directory, where supported.
fn created_at(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|meta| meta.created())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::error::GwtError;

    fn git(dir: &Path, args: &[&str]) -> Result<()> {
        Git::default().run(dir, args)?;
        Ok(())
    }

    /// Create a repository with one commit; returns its canonical root.
    fn setup_test_repo() -> Result<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().join("repo");
        fs::create_dir(&repo_path)?;
        let repo_path = repo_path.canonicalize()?;

        git(&repo_path, &["init", "-b", "main"])?;
        git(&repo_path, &["config", "user.email", "test@example.com"])?;
        git(&repo_path, &["config", "user.name", "Test User"])?;
        fs::write(repo_path.join("README.md"), "# Test Repo")?;
        git(&repo_path, &["add", "README.md"])?;
        git(&repo_path, &["commit", "-m", "Initial commit"])?;

        Ok((temp_dir, repo_path))
    }

    fn open_store(repo_path: &Path) -> Result<WorktreeStore> {
        let handle = RepositoryHandle::open(repo_path)?;
        Ok(WorktreeStore::new(handle, &Config::default()))
    }

    fn linked_request(temp_dir: &TempDir, branch: &str) -> Result<WorktreeCreationRequest> {
        let parent = temp_dir.path().canonicalize()?;
        Ok(WorktreeCreationRequest {
            branch: branch.to_string(),
            path: parent.join(branch.replace('/', "-")),
            create_branch: true,
            ..Default::default()
        })
    }

    #[test]
    fn single_main_worktree() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;

        let records = store.enumerate()?;
        assert_eq!(records.len(), 1);

        let main = &records[0];
        assert!(main.is_main);
        assert_eq!(main.path, repo_path);
        assert_eq!(main.branch, "main");
        assert!(!main.is_dirty);
        assert!(!main.is_locked);
        assert_eq!(main.last_commit.subject, "Initial commit");
        assert_eq!(main.last_commit.author, "Test User");
        assert_eq!(main.last_commit.hash.len(), 40);
        assert!(main.last_commit.date.is_some());

        Ok(())
    }

    #[test]
    fn linked_worktrees_follow_main_in_creation_order() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;

        let first = linked_request(&temp_dir, "feature/one")?;
        let second = linked_request(&temp_dir, "two")?;
        store.create(&first)?;
        store.create(&second)?;

        let records = store.enumerate()?;
        assert_eq!(records.len(), 3);
        assert_eq!(records.iter().filter(|r| r.is_main).count(), 1);
        assert!(records[0].is_main);
        assert_eq!(records[0].path, repo_path);
        assert_eq!(records[1].branch, "feature/one");
        assert_eq!(records[1].path, first.path);
        assert!(!records[1].is_main);
        assert_eq!(records[2].branch, "two");
        assert_eq!(
            records[1].last_commit.hash, records[0].last_commit.hash,
            "new branch starts at HEAD"
        );

        Ok(())
    }

    #[test]
    fn opening_from_a_subdirectory_enumerates_the_same() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        let nested = repo_path.join("a").join("b");
        fs::create_dir_all(&nested)?;

        let records = open_store(&nested)?.enumerate()?;
        assert_eq!(records[0].path, repo_path);

        Ok(())
    }

    #[test]
    fn opening_from_a_linked_worktree_keeps_main_root() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let request = linked_request(&temp_dir, "side")?;
        open_store(&repo_path)?.create(&request)?;

        let store = open_store(&request.path.join("."))?;
        assert_eq!(store.repository().root(), repo_path.as_path());

        let records = store.enumerate()?;
        let main: Vec<_> = records.iter().filter(|r| r.is_main).collect();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].path, store.repository().root());
        assert_eq!(records[1].path, request.path);

        Ok(())
    }

    #[test]
    fn create_returns_request_fields_only() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "topic")?;

        let record = store.create(&request)?;
        assert_eq!(record.path, request.path);
        assert_eq!(record.branch, "topic");
        assert!(!record.is_main);
        assert!(record.last_commit.is_empty());
        assert!(request.path.join(".git").is_file());

        Ok(())
    }

    #[test]
    fn dirty_and_locked_status() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "busy")?;
        store.create(&request)?;

        fs::write(request.path.join("scratch.txt"), "work in progress")?;
        let path_arg = request.path.to_string_lossy().into_owned();
        git(&repo_path, &["worktree", "lock", path_arg.as_str()])?;

        let records = store.enumerate()?;
        let busy = records.iter().find(|r| r.branch == "busy").unwrap();
        assert!(busy.is_dirty);
        assert!(busy.is_locked);
        assert_eq!(busy.status_label(), "locked");
        assert!(!records[0].is_dirty);

        git(&repo_path, &["worktree", "unlock", path_arg.as_str()])?;
        Ok(())
    }

    #[test]
    fn locked_worktree_needs_unlock_before_removal() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "pinned")?;
        store.create(&request)?;
        let path_arg = request.path.to_string_lossy().into_owned();
        git(&repo_path, &["worktree", "lock", path_arg.as_str()])?;

        assert!(store.remove(&request.path).is_err());
        assert!(request.path.exists());

        store.unlock(&request.path)?;
        assert!(!store.enumerate()?.iter().any(|r| r.is_locked));
        store.remove(&request.path)?;
        assert!(!request.path.exists());
        assert_eq!(store.enumerate()?.len(), 1);

        Ok(())
    }

    #[test]
    fn detached_worktree_has_empty_branch() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let path = temp_dir.path().canonicalize()?.join("detached");
        let path_arg = path.to_string_lossy().into_owned();
        git(&repo_path, &["worktree", "add", "--detach", path_arg.as_str()])?;

        let records = store.enumerate()?;
        let detached = records.iter().find(|r| r.path == path).unwrap();
        assert!(detached.is_detached());
        assert!(!detached.last_commit.is_empty());

        Ok(())
    }

    #[test]
    fn prunable_worktrees_are_dropped_and_reported_stale() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "doomed")?;
        store.create(&request)?;
        fs::remove_dir_all(&request.path)?;

        let records = store.enumerate()?;
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r.path != request.path));

        let stale = store.stale()?;
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].path, request.path);
        assert_eq!(stale[0].branch, "doomed");

        store.prune()?;
        assert!(store.stale()?.is_empty());

        Ok(())
    }

    #[test]
    fn branch_exists_reports_false_for_absent_branch() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;

        assert!(store.branch_exists("main")?);
        assert!(!store.branch_exists("no-such-branch")?);

        Ok(())
    }

    #[test]
    fn branch_exists_surfaces_tool_failures() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        let mut config = Config::default();
        config.git.program = "gwt-test-no-such-git-binary".to_string();
        let store = WorktreeStore::new(RepositoryHandle::open(&repo_path)?, &config);

        assert!(matches!(
            store.branch_exists("main"),
            Err(GwtError::ToolInvocation { .. })
        ));

        Ok(())
    }

    #[test]
    fn create_with_missing_base_carries_git_diagnostic() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = WorktreeCreationRequest {
            branch: "topic".to_string(),
            path: temp_dir.path().join("topic"),
            base_branch: Some("no-such-base".to_string()),
            create_branch: false,
            force: false,
        };

        let err = store.create(&request).unwrap_err();
        let output = err.tool_output().unwrap();
        assert!(
            output.contains("no-such-base"),
            "expected git's own diagnostic, got: {output}"
        );
        assert!(!request.path.exists());

        Ok(())
    }

    #[test]
    fn create_into_non_empty_directory_fails_with_diagnostic() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "occupied")?;
        fs::create_dir_all(&request.path)?;
        fs::write(request.path.join("keep.txt"), "existing")?;

        let err = store.create(&request).unwrap_err();
        assert!(matches!(err, GwtError::ToolInvocation { .. }));
        let output = err.tool_output().unwrap_or_default();
        assert!(output.contains("already exists"), "unexpected output: {output}");
        assert!(request.path.join("keep.txt").exists());

        Ok(())
    }

    #[test]
    fn create_checks_out_existing_branch() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        git(&repo_path, &["branch", "existing"])?;

        let mut request = linked_request(&temp_dir, "existing")?;
        request.create_branch = false;
        store.create(&request)?;

        let records = store.enumerate()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].branch, "existing");

        Ok(())
    }

    #[test]
    fn create_new_branch_from_base() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        git(&repo_path, &["branch", "develop"])?;
        fs::write(repo_path.join("later.txt"), "later")?;
        git(&repo_path, &["add", "later.txt"])?;
        git(&repo_path, &["commit", "-m", "Later commit"])?;

        let mut request = linked_request(&temp_dir, "from-develop")?;
        request.base_branch = Some("develop".to_string());
        store.create(&request)?;

        assert!(!request.path.join("later.txt").exists());
        let records = store.enumerate()?;
        assert_eq!(records[1].last_commit.subject, "Initial commit");

        Ok(())
    }

    #[test]
    fn remove_and_remove_failure() -> Result<()> {
        let (temp_dir, repo_path) = setup_test_repo()?;
        let store = open_store(&repo_path)?;
        let request = linked_request(&temp_dir, "short-lived")?;
        store.create(&request)?;

        fs::write(request.path.join("dirty.txt"), "uncommitted")?;
        let err = store.remove(&request.path).unwrap_err();
        assert!(err.tool_output().is_some_and(|o| !o.is_empty()));
        assert!(request.path.exists());

        fs::remove_file(request.path.join("dirty.txt"))?;
        store.remove(&request.path)?;
        assert!(!request.path.exists());
        assert_eq!(store.enumerate()?.len(), 1);

        Ok(())
    }

    #[test]
    fn repository_without_commits_has_empty_snapshot() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().canonicalize()?.join("empty");
        fs::create_dir(&repo_path)?;
        git(&repo_path, &["init", "-b", "main"])?;

        let records = open_store(&repo_path)?.enumerate()?;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_main);
        assert!(records[0].last_commit.is_empty());

        Ok(())
    }
}
