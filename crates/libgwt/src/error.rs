use std::{io, path::PathBuf, result::Result as StdResult};
use thiserror::Error;

/// Custom Result type for gwt operations.
pub type Result<T> = StdResult<T, GwtError>;

/// gwt-specific error types
#[derive(Error, Debug)]
pub enum GwtError {
    /// The path handed to the repository locator does not exist.
    #[error("Path does not exist: {}", path.display())]
    PathNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// No git metadata was found walking up to the filesystem root.
    #[error("Not a git repository (or any parent): {}", path.display())]
    NotARepository {
        /// The path the search started from.
        path: PathBuf,
    },

    /// The git executable could not be started or exited non-zero.
    #[error("Git command failed: {command}\n{output}")]
    ToolInvocation {
        /// The command line that was run.
        command: String,
        /// Combined stdout and stderr of the invocation, verbatim.
        output: String,
    },

    /// The main worktree cannot be removed.
    #[error("Refusing to remove the main worktree: {}", path.display())]
    MainWorktree {
        /// Path of the main worktree.
        path: PathBuf,
    },

    /// No worktree matched the requested branch or path.
    #[error("No worktree found for: {0}")]
    WorktreeNotFound(String),

    /// The target directory for a new worktree already exists.
    #[error("Directory already exists: {} (use --force to create anyway)", path.display())]
    TargetExists {
        /// The target directory.
        path: PathBuf,
    },

    /// The requested editor is not in the editor table.
    #[error("Unsupported editor: {0}")]
    UnknownEditor(String),

    /// Neither the requested editor nor any fallback is installed.
    #[error("Editor '{0}' is not installed or not on PATH")]
    EditorUnavailable(String),

    /// The configuration file could not be read, parsed, or updated.
    #[error("Config error: {0}")]
    Config(String),

    /// The operation was cancelled by the user.
    #[error("Aborted by user")]
    UserAborted,

    /// An underlying I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl GwtError {
    /// Return the recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UserAborted => 130,
            Self::PathNotFound { .. } | Self::NotARepository { .. } => 2,
            Self::MainWorktree { .. } | Self::TargetExists { .. } => 3,
            Self::ToolInvocation { .. } => 4,
            _ => 1,
        }
    }

    /// Raw git output attached to a tool failure, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::ToolInvocation { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_failure_kinds() {
        assert_eq!(GwtError::UserAborted.exit_code(), 130);
        assert_eq!(
            GwtError::NotARepository {
                path: PathBuf::from("/tmp")
            }
            .exit_code(),
            2
        );
        assert_eq!(
            GwtError::ToolInvocation {
                command: "git worktree prune".to_string(),
                output: String::new(),
            }
            .exit_code(),
            4
        );
        assert_eq!(GwtError::WorktreeNotFound("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn tool_output_is_carried_verbatim() {
        let err = GwtError::ToolInvocation {
            command: "git worktree add /tmp/x".to_string(),
            output: "fatal: invalid reference: nope\n".to_string(),
        };
        assert_eq!(err.tool_output(), Some("fatal: invalid reference: nope\n"));
        assert!(err.to_string().contains("fatal: invalid reference: nope"));
        assert_eq!(GwtError::UserAborted.tool_output(), None);
    }
}
