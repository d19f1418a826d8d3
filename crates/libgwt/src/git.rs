use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Command, Output},
};

use tracing::debug;

use crate::{
    error::{GwtError, Result},
    types::WorktreeCreationRequest,
};

/// Pretty-format string for the last-commit query; fields are `|`-separated.
pub const LAST_COMMIT_FORMAT: &str = "--pretty=format:%H|%s|%an|%ai";

/// Handle on the git executable used for every invocation.
#[derive(Debug, Clone)]
pub struct Git {
    /// Program name or path of the git executable.
    program: String,
}

impl Git {
    /// Use `program` (a name on the search path or a full path) as git.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Render `args` as a human-readable command line for diagnostics.
    fn command_line<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
        }
        line
    }

    /// Run git with `args` in `dir`.
    ///
    /// Returns the captured output on success. A spawn failure or non-zero
    /// exit becomes [`GwtError::ToolInvocation`] carrying the combined output.
    pub fn run<S: AsRef<OsStr>>(&self, dir: &Path, args: &[S]) -> Result<Output> {
        let command = self.command_line(args);
        debug!(dir = %dir.display(), %command, "running git");

        let output = Command::new(&self.program)
            .current_dir(dir)
            .args(args)
            .output()
            .map_err(|err| GwtError::ToolInvocation {
                command: command.clone(),
                output: format!("failed to start {}: {err}", self.program),
            })?;

        if !output.status.success() {
            debug!(%command, status = ?output.status.code(), "git exited non-zero");
            return Err(GwtError::ToolInvocation {
                command,
                output: combined_output(&output),
            });
        }

        Ok(output)
    }

    /// Run git and return its stdout as (lossy) UTF-8 text.
    pub fn run_stdout<S: AsRef<OsStr>>(&self, dir: &Path, args: &[S]) -> Result<String> {
        let output = self.run(dir, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Raw `git worktree list --porcelain` text for the repository at `repo_path`.
    pub fn worktree_list_porcelain(&self, repo_path: &Path) -> Result<String> {
        self.run_stdout(repo_path, &["worktree", "list", "--porcelain"])
    }

    /// Check whether the worktree at `path` has staged, unstaged or untracked changes.
    pub fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        let status = self.run_stdout(path, &["status", "--porcelain"])?;
        Ok(!status.trim().is_empty())
    }

    /// Determine if a local branch named `branch_name` exists.
    pub fn has_branch(&self, repo_path: &Path, branch_name: &str) -> Result<bool> {
        let listing = self.run_stdout(repo_path, &["branch", "--list", branch_name])?;
        Ok(!listing.trim().is_empty())
    }

    /// One-line description of HEAD in `path`, formatted with [`LAST_COMMIT_FORMAT`].
    pub fn last_commit_line(&self, path: &Path) -> Result<String> {
        self.run_stdout(path, &["log", "-1", LAST_COMMIT_FORMAT, "HEAD"])
    }

    /// Add a worktree as described by `request`.
    pub fn add_worktree(&self, repo_path: &Path, request: &WorktreeCreationRequest) -> Result<()> {
        let args = worktree_add_args(request);
        self.run(repo_path, args.as_slice())?;
        Ok(())
    }

    /// Remove the worktree at `worktree_path`.
    pub fn remove_worktree(&self, repo_path: &Path, worktree_path: &Path) -> Result<()> {
        let args: [&OsStr; 3] = [
            OsStr::new("worktree"),
            OsStr::new("remove"),
            worktree_path.as_os_str(),
        ];
        self.run(repo_path, &args)?;
        Ok(())
    }

    /// Clear the lock on the worktree at `worktree_path`.
    pub fn unlock_worktree(&self, repo_path: &Path, worktree_path: &Path) -> Result<()> {
        let args: [&OsStr; 3] = [
            OsStr::new("worktree"),
            OsStr::new("unlock"),
            worktree_path.as_os_str(),
        ];
        self.run(repo_path, &args)?;
        Ok(())
    }

    /// Drop administrative records for worktrees whose directories are gone.
    pub fn prune_worktrees(&self, repo_path: &Path) -> Result<()> {
        self.run(repo_path, &["worktree", "prune"])?;
        Ok(())
    }
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

/// Concatenate stdout and stderr the way a terminal would show them.
fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Build the argument list for `git worktree add`.
///
/// Order: `--force`, `-b <branch>`, the target path, then the commit to check
/// out. Without `-b` the commit defaults to the branch itself so an existing
/// branch is checked out rather than one derived from the directory name.
pub fn worktree_add_args(request: &WorktreeCreationRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["worktree".into(), "add".into()];
    if request.force {
        args.push("--force".into());
    }
    if request.create_branch {
        args.push("-b".into());
        args.push(request.branch.clone().into());
    }
    args.push(request.path.clone().into_os_string());

    let base = request.base_branch.as_deref().filter(|b| !b.is_empty());
    if let Some(base) = base {
        args.push(base.into());
    } else if !request.create_branch && !request.branch.is_empty() {
        args.push(request.branch.clone().into());
    }
    args
}
