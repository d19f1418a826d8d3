use std::path::Path;

use anyhow::Result;
use gwt_term::Output;
use libgwt::{Config, WorktreeStore};

use super::create::create_default;
use crate::{
    ui::{confirm_unless, emit, map_output_error},
    utils::{open_shell, worktree_for_branch},
};

/// Run the `gwt switch` command logic.
///
/// Processes cannot change their parent's directory, so this starts a new
/// shell inside the worktree; exiting it returns to the original shell.
pub fn switch(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    branch: &str,
    no_prompt: bool,
) -> Result<()> {
    let records = store.enumerate()?;

    let path = match worktree_for_branch(&records, branch) {
        Some(record) => record.path.clone(),
        None => {
            emit(output.warn(&format!("No worktree for branch {branch}")))?;
            confirm_unless(no_prompt, output, "Create one?")?;
            create_default(store, output, config, cwd, branch)?
        }
    };

    let section = output
        .section("Switching to worktree")
        .map_err(map_output_error)?;
    emit(section.item("branch", branch))?;
    emit(section.item("path", &path.display().to_string()))?;
    emit(output.finish())?;

    open_shell(&path)
}
