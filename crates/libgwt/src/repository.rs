use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{GwtError, Result};

/// Name of the git metadata entry at the top of every worktree.
const DOT_GIT: &str = ".git";

/// Prefix of the pointer line inside a linked worktree's `.git` file.
const GITDIR_PREFIX: &str = "gitdir:";

/// File in a linked worktree's metadata directory naming the shared one.
const COMMONDIR_FILE: &str = "commondir";

/// An opened repository: where it lives and where its metadata is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Top-level directory of the main checkout.
    root: PathBuf,
    /// Git metadata directory of that checkout.
    git_dir: PathBuf,
}

impl RepositoryHandle {
    /// Locate the repository containing `path`, walking up through its ancestors.
    ///
    /// At each level a `.git` directory is taken as the metadata directory and
    /// its parent as the root. A `.git` file containing `gitdir: <target>`
    /// belongs to a linked worktree: the shared metadata directory named by
    /// `<target>/commondir` is used instead, and the root is the main
    /// checkout holding it. Pointers without a `commondir` keep the pointer's
    /// directory as the root.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GwtError::PathNotFound {
                path: path.to_path_buf(),
            });
        }

        let start = path.canonicalize()?;
        let mut current = start.as_path();
        loop {
            if let Some(handle) = Self::detect_at(current) {
                debug!(
                    root = %handle.root.display(),
                    git_dir = %handle.git_dir.display(),
                    "opened repository"
                );
                return Ok(handle);
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => return Err(GwtError::NotARepository { path: start }),
            }
        }
    }

    /// Check `dir` for git metadata without recursing.
    fn detect_at(dir: &Path) -> Option<Self> {
        let dot_git = dir.join(DOT_GIT);
        let meta = fs::metadata(&dot_git).ok()?;

        if meta.is_dir() {
            return Some(Self {
                root: dir.to_path_buf(),
                git_dir: dot_git,
            });
        }

        let target = read_gitdir_pointer(&dot_git)?;
        let git_dir = normalize(&dir.join(target));
        if let Some(common) = read_commondir(&git_dir)
            && common.file_name().is_some_and(|name| name == DOT_GIT)
            && let Some(main_root) = common.parent()
        {
            return Some(Self {
                root: main_root.to_path_buf(),
                git_dir: common,
            });
        }

        Some(Self {
            root: dir.to_path_buf(),
            git_dir,
        })
    }

    /// Top-level directory of the main checkout.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Git metadata directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

/// Read a `.git` pointer file and return its `gitdir:` target, if any.
fn read_gitdir_pointer(path: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        line.trim()
            .strip_prefix(GITDIR_PREFIX)
            .map(|target| PathBuf::from(target.trim()))
            .filter(|target| !target.as_os_str().is_empty())
    })
}

/// Shared metadata directory a linked worktree's `git_dir` points at.
fn read_commondir(git_dir: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(git_dir.join(COMMONDIR_FILE)).ok()?;
    let target = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    git_dir.join(target).canonicalize().ok()
}

/// Resolve `..` and symlinks when `path` exists; leave it untouched otherwise.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
