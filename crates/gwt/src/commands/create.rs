use std::path::{Path, PathBuf};

use anyhow::Result;
use gwt_term::Output;
use libgwt::{Config, GwtError, WorktreeCreationRequest, WorktreeRecord, WorktreeStore};

use crate::{
    ui::{emit, map_output_error},
    utils::{absolute_from, default_worktree_path},
};

/// Parameters for the `gwt create` command.
pub struct CreateParams {
    /// Branch to check out or create.
    pub branch: String,
    /// Explicit target directory, relative to the working directory.
    pub path: Option<String>,
    /// Reference to start a new branch from.
    pub base: Option<String>,
    /// Proceed even if the target directory exists.
    pub force: bool,
}

/// Run the `gwt create` command logic.
pub fn create(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    params: CreateParams,
) -> Result<()> {
    let CreateParams {
        branch,
        path,
        mut base,
        force,
    } = params;

    let path = match path {
        Some(path) => absolute_from(cwd, &path),
        None => default_worktree_path(config, cwd, &branch),
    };
    let branch_exists = store.branch_exists(&branch)?;

    let section = output
        .section("Creating worktree")
        .map_err(map_output_error)?;
    emit(section.item("branch", &branch))?;
    emit(section.item("path", &path.display().to_string()))?;
    if branch_exists {
        if let Some(ignored) = base.take() {
            emit(section.warn(&format!(
                "branch {branch} already exists, ignoring base {ignored}"
            )))?;
        }
    } else {
        let origin = base.as_deref().unwrap_or("HEAD");
        emit(section.item("new branch from", origin))?;
    }

    if path.exists() {
        if !force {
            return Err(GwtError::TargetExists { path }.into());
        }
        emit(section.warn("target directory exists, continuing because of --force"))?;
    }

    let request = WorktreeCreationRequest {
        branch,
        path,
        base_branch: base,
        create_branch: !branch_exists,
        force,
    };
    let record = add_with_spinner(store, output, &request)?;

    emit(output.success("Worktree created"))?;
    emit(output.message(&format!("  cd {}", record.path.display())))?;
    emit(output.message(&format!("  gwt edit {}", record.branch)))?;
    Ok(())
}

/// Create the worktree for `branch` at its default location, creating the
/// branch when needed.
pub fn create_default(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    branch: &str,
) -> Result<PathBuf> {
    let request = WorktreeCreationRequest {
        branch: branch.to_string(),
        path: default_worktree_path(config, cwd, branch),
        base_branch: None,
        create_branch: !store.branch_exists(branch)?,
        force: false,
    };
    let record = add_with_spinner(store, output, &request)?;
    emit(output.success(&format!("Created worktree at {}", record.path.display())))?;
    Ok(record.path)
}

/// Run the git add step behind a spinner.
fn add_with_spinner(
    store: &WorktreeStore,
    output: &dyn Output,
    request: &WorktreeCreationRequest,
) -> Result<WorktreeRecord> {
    let spinner = output.spinner("Adding worktree...");
    let result = store.create(request);
    spinner.finish();
    Ok(result?)
}
