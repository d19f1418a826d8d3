use std::{fs, path::Path};

use anyhow::{Context, Result};
use gwt_term::Output;
use libgwt::{GwtError, WorktreeStore};
use tracing::warn;

use crate::{
    ui::{branch_label, confirm_unless, emit, map_output_error},
    utils::resolve_worktree,
};

/// Run the `gwt remove` command logic.
pub fn remove(
    store: &WorktreeStore,
    output: &dyn Output,
    target: &str,
    force: bool,
    no_prompt: bool,
    cwd: &Path,
) -> Result<()> {
    let records = store.enumerate()?;
    let record = resolve_worktree(&records, target, cwd)
        .ok_or_else(|| GwtError::WorktreeNotFound(target.to_string()))?;

    if record.is_main {
        return Err(GwtError::MainWorktree {
            path: record.path.clone(),
        }
        .into());
    }

    let section = output
        .section("Removing worktree")
        .map_err(map_output_error)?;
    emit(section.item("path", &record.path.display().to_string()))?;
    emit(section.item("branch", branch_label(record)))?;
    if record.is_dirty {
        emit(section.warn("uncommitted changes will be lost"))?;
    }

    if record.is_locked {
        emit(section.warn("worktree is locked (use --force to unlock and remove)"))?;
    }

    confirm_unless(force || no_prompt, output, "Remove this worktree?")?;

    // A locked record survives both `worktree remove` and `worktree prune`.
    if record.is_locked && force {
        store.unlock(&record.path)?;
    }

    let spinner = output.spinner("Removing worktree...");
    if let Err(err) = store.remove(&record.path) {
        if !force {
            spinner.finish();
            return Err(err.into());
        }
        warn!(path = %record.path.display(), %err, "git refused removal, deleting directory");
        spinner.set_message("Deleting worktree directory...");
        let deleted = fs::remove_dir_all(&record.path)
            .with_context(|| format!("Failed to delete {}", record.path.display()));
        let pruned = deleted.is_ok().then(|| store.prune());
        spinner.finish();

        deleted?;
        emit(output.warn("git could not remove the worktree, deleted the directory"))?;
        if let Some(Err(err)) = pruned {
            emit(output.warn(&format!("Failed to prune worktree records: {err}")))?;
        }
    } else {
        spinner.finish();
    }

    emit(output.success("Worktree removed"))?;
    Ok(())
}
