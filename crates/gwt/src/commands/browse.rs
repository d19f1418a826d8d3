use std::path::Path;

use anyhow::Result;
use gwt_term::Output;
use libgwt::{Config, EditorRegistry, WorktreeStore};

use super::edit::open_in_editor;
use crate::{
    ui::{branch_label, emit, prompt_select_optional},
    utils::{display_path, open_shell},
};

/// Run the `gwt browse` command logic.
pub fn browse(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    edit: bool,
) -> Result<()> {
    let records = store.enumerate()?;
    if records.is_empty() {
        emit(output.message("No worktrees found."))?;
        return Ok(());
    }

    let options = records
        .iter()
        .map(|r| {
            format!(
                "{}  {}  [{}]",
                branch_label(r),
                display_path(&r.path, cwd),
                r.status_label()
            )
        })
        .collect();
    let Some(index) = prompt_select_optional(output, "Select a worktree:", options)? else {
        return Ok(());
    };
    let Some(record) = records.get(index) else {
        return Ok(());
    };

    if edit {
        open_in_editor(
            output,
            config,
            &EditorRegistry::new(),
            None,
            &record.path,
            false,
            false,
        )
    } else {
        emit(output.message(&format!("Entering {}", record.path.display())))?;
        emit(output.finish())?;
        open_shell(&record.path)
    }
}
