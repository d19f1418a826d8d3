use anyhow::Result;
use gwt_term::Output;
use libgwt::WorktreeStore;

use crate::ui::{confirm_unless, emit, map_output_error};

/// Run the `gwt prune` command logic.
pub fn prune(
    store: &WorktreeStore,
    output: &dyn Output,
    dry_run: bool,
    no_prompt: bool,
) -> Result<()> {
    let stale = store.stale()?;
    if stale.is_empty() {
        emit(output.message("No stale worktrees to prune."))?;
        return Ok(());
    }

    let section = output
        .section(&format!("Found {} stale worktree(s):", stale.len()))
        .map_err(map_output_error)?;
    for entry in &stale {
        let branch = if entry.branch.is_empty() {
            "detached"
        } else {
            entry.branch.as_str()
        };
        emit(section.item(&entry.path.display().to_string(), branch))?;
        if let Some(reason) = &entry.reason {
            emit(section.message(&format!("  {reason}")))?;
        }
    }

    if dry_run {
        emit(output.message("Dry run, nothing was pruned."))?;
        return Ok(());
    }

    confirm_unless(no_prompt, output, "Prune these worktrees?")?;
    store.prune()?;
    emit(output.success("Pruned stale worktrees"))?;
    Ok(())
}
