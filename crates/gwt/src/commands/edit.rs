use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Result;
use gwt_term::Output;
use libgwt::{Config, EditorRegistry, GwtError, WorktreeStore};

use super::create::create_default;
use crate::{
    ui::{confirm_unless, emit, map_output_error},
    utils::{absolute_from, launch_editor, resolve_worktree},
};

/// Parameters for the `gwt edit` command.
pub struct EditParams {
    /// Branch name or path to open.
    pub target: String,
    /// Editor requested on the command line.
    pub editor: Option<String>,
    /// Block until the editor exits.
    pub wait: bool,
    /// Ask the editor for a new window.
    pub new_window: bool,
}

impl EditParams {
    /// Open `target` in `editor` with default flags.
    pub fn with_editor(target: String, editor: &str) -> Self {
        Self {
            target,
            editor: Some(editor.to_string()),
            wait: false,
            new_window: false,
        }
    }
}

/// Run the `gwt edit` command logic.
pub fn edit(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    params: EditParams,
    no_prompt: bool,
) -> Result<()> {
    let path = locate(store, output, config, cwd, &params.target, no_prompt)?;
    open_in_editor(
        output,
        config,
        &EditorRegistry::new(),
        params.editor.as_deref(),
        &path,
        params.new_window,
        params.wait,
    )
}

/// Directory to open for `target`.
///
/// A known worktree wins, then any existing path. A branch without a
/// worktree gets one after confirmation.
fn locate(
    store: &WorktreeStore,
    output: &dyn Output,
    config: &Config,
    cwd: &Path,
    target: &str,
    no_prompt: bool,
) -> Result<PathBuf> {
    let records = store.enumerate()?;
    if let Some(record) = resolve_worktree(&records, target, cwd) {
        return Ok(record.path.clone());
    }

    let candidate = absolute_from(cwd, target);
    if candidate.exists() {
        return Ok(candidate);
    }

    if store.branch_exists(target)? {
        emit(output.warn(&format!("Branch {target} exists but has no worktree")))?;
        confirm_unless(no_prompt, output, "Create one?")?;
        return create_default(store, output, config, cwd, target);
    }

    Err(GwtError::WorktreeNotFound(target.to_string()).into())
}

/// Open `path` in the requested editor, or the preferred one when `requested` is `None`.
pub fn open_in_editor(
    output: &dyn Output,
    config: &Config,
    registry: &EditorRegistry,
    requested: Option<&str>,
    path: &Path,
    new_window: bool,
    wait: bool,
) -> Result<()> {
    let name = match requested {
        Some(name) => name.to_string(),
        None => {
            let environment = [env::var("EDITOR").ok(), env::var("VISUAL").ok()];
            registry.preferred_name(config, &environment)
        }
    };
    let editor = match registry.detect(&name) {
        Ok(editor) => editor,
        Err(err) => {
            let installed: Vec<&str> = registry.available().iter().map(|e| e.command).collect();
            if !installed.is_empty() {
                emit(output.message(&format!("Installed editors: {}", installed.join(", "))))?;
            }
            return Err(err.into());
        }
    };
    if !editor.matches(&name) {
        emit(output.warn(&format!("{name} is not installed, using {editor}")))?;
    }

    let section = output
        .section("Opening in editor")
        .map_err(map_output_error)?;
    emit(section.item("path", &path.display().to_string()))?;
    emit(section.item("editor", &editor.to_string()))?;
    emit(output.finish())?;

    launch_editor(editor, path, new_window, wait)
}
