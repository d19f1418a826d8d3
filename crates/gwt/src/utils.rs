use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use libgwt::{Config, EditorInfo, WorktreeRecord};
use tracing::debug;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "GWT_CONFIG";

/// Shell used when `$SHELL` is unset.
const FALLBACK_SHELL: &str = "/bin/sh";

/// Expand a leading `~` in a filesystem path using the `HOME` environment variable.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with('~')
        && let Ok(home) = env::var("HOME")
    {
        return PathBuf::from(path.replacen('~', &home, 1));
    }
    PathBuf::from(path)
}

/// Configuration file location (priority: CLI flag > `GWT_CONFIG` > `~/.gwt.toml`).
pub fn config_path(flag: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(expand_tilde(path));
    }
    if let Ok(path) = env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Ok(expand_tilde(&path));
    }
    Config::default_path().context("Cannot determine home directory for ~/.gwt.toml")
}

/// Make `path` absolute against `cwd`, expanding a leading `~`.
pub fn absolute_from(cwd: &Path, path: &str) -> PathBuf {
    let path = expand_tilde(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Where a new worktree for `branch` goes when no path is given.
pub fn default_worktree_path(config: &Config, cwd: &Path, branch: &str) -> PathBuf {
    match &config.paths.base {
        Some(base) => absolute_from(cwd, &base.to_string_lossy()).join(branch),
        None => cwd.join(branch),
    }
}

/// Whether `a` and `b` name the same directory, resolving symlinks when possible.
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Find the worktree `target` refers to.
///
/// Tried in order: exact branch name, then the path `target` resolves to from
/// `cwd`, then the first worktree whose path or branch contains `target`.
pub fn resolve_worktree<'a>(
    records: &'a [WorktreeRecord],
    target: &str,
    cwd: &Path,
) -> Option<&'a WorktreeRecord> {
    if target.is_empty() {
        return None;
    }
    if let Some(record) = records.iter().find(|r| r.branch == target) {
        return Some(record);
    }

    let wanted = absolute_from(cwd, target);
    if let Some(record) = records.iter().find(|r| same_path(&r.path, &wanted)) {
        return Some(record);
    }

    records
        .iter()
        .find(|r| r.path.to_string_lossy().contains(target) || r.branch.contains(target))
}

/// Worktree that owns `branch`, compared exactly.
pub fn worktree_for_branch<'a>(
    records: &'a [WorktreeRecord],
    branch: &str,
) -> Option<&'a WorktreeRecord> {
    records.iter().find(|r| r.branch == branch)
}

/// `path` relative to `cwd` when it lies beneath it, otherwise unchanged.
pub fn display_path(path: &Path, cwd: &Path) -> String {
    match path.strip_prefix(cwd) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Start an interactive `$SHELL` in `dir` and wait for it to exit.
pub fn open_shell(dir: &Path) -> Result<()> {
    let shell = env::var("SHELL").unwrap_or_else(|_| FALLBACK_SHELL.to_string());
    debug!(%shell, dir = %dir.display(), "starting shell");

    let status = Command::new(&shell)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to start shell {shell}"))?;
    debug!(code = ?status.code(), "shell exited");
    Ok(())
}

/// Open `dir` in `editor` and wait for the editor process to return.
pub fn launch_editor(editor: &EditorInfo, dir: &Path, new_window: bool, wait: bool) -> Result<()> {
    let args = editor.launch_args(dir, new_window, wait);
    debug!(editor = editor.command, ?args, "launching editor");

    let status = Command::new(editor.command)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to start editor {editor}"))?;
    anyhow::ensure!(
        status.success(),
        "Editor {editor} exited with status {}",
        status.code().unwrap_or(1)
    );
    Ok(())
}
