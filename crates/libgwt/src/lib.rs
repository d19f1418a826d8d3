#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for inspecting and managing the worktrees of a Git repository.
//!
//! Every git-level operation is delegated to the external `git` executable.
//! Callers open a [`RepositoryHandle`] from any path inside a repository, wrap
//! it in a [`WorktreeStore`], and issue enumerate/create/remove/prune
//! operations against it. The CLI binary in `crates/gwt` builds on top of
//! this library.

/// Explicit configuration value shared by the store and its callers.
mod config;
/// Editor lookup table and detection.
mod editor;
/// Error type for all library operations.
mod error;
/// Helper routines for invoking the git executable.
mod git;
/// Parser for `git worktree list --porcelain` output.
mod porcelain;
/// Repository discovery from an arbitrary filesystem path.
mod repository;
/// Worktree enumeration and mutation against a repository.
mod store;
/// Value types describing worktrees and commits.
mod types;

pub use config::{Config, DisplayConfig, EditorConfig, GitConfig, PathsConfig};
pub use editor::{EditorInfo, EditorRegistry};
pub use error::{GwtError, Result};
pub use porcelain::{ListingEntry, parse_commit_line, parse_worktree_list};
pub use repository::RepositoryHandle;
pub use store::WorktreeStore;
pub use types::{CommitSnapshot, StaleWorktree, WorktreeCreationRequest, WorktreeRecord};
