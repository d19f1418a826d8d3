use std::result::Result as StdResult;

use anyhow::Result;
use gwt_term::{Output, OutputError};
use libgwt::{GwtError, WorktreeRecord};

/// Longest commit subject shown before truncation.
const SUBJECT_WIDTH: usize = 50;

/// Convert output-layer failures into domain errors.
pub fn map_output_error(err: OutputError) -> anyhow::Error {
    match err {
        OutputError::Cancelled => GwtError::UserAborted.into(),
        other => anyhow::anyhow!("Output operation failed: {other}"),
    }
}

/// Emit an output result, mapping errors into `GwtError`.
pub fn emit(result: StdResult<(), OutputError>) -> Result<()> {
    result.map_err(map_output_error)
}

/// Prompt for confirmation, mapping cancellation to `UserAborted`.
pub fn prompt_confirm(output: &dyn Output, prompt: &str) -> Result<bool> {
    output.confirm(prompt).map_err(map_output_error)
}

/// Prompt for selection, returning `None` on cancellation.
pub fn prompt_select_optional(
    output: &dyn Output,
    prompt: &str,
    options: Vec<String>,
) -> Result<Option<usize>> {
    match output.select(prompt, options) {
        Ok(selection) => Ok(Some(selection)),
        Err(OutputError::Cancelled) => Ok(None),
        Err(err) => Err(map_output_error(err)),
    }
}

/// Ask whether to go ahead; `no_prompt` answers yes without asking.
pub fn confirm_unless(no_prompt: bool, output: &dyn Output, prompt: &str) -> Result<()> {
    if no_prompt || prompt_confirm(output, prompt)? {
        Ok(())
    } else {
        Err(GwtError::UserAborted.into())
    }
}

/// Branch label for display; detached worktrees have none.
pub fn branch_label(record: &WorktreeRecord) -> &str {
    if record.is_detached() {
        "(detached HEAD)"
    } else {
        &record.branch
    }
}

/// One-line summary of a worktree's last commit.
pub fn commit_summary(record: &WorktreeRecord) -> String {
    let commit = &record.last_commit;
    if commit.is_empty() {
        return "no commits".to_string();
    }
    let subject = if commit.subject.chars().count() > SUBJECT_WIDTH {
        let cut: String = commit.subject.chars().take(SUBJECT_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        commit.subject.clone()
    };
    format!("{} {subject}", commit.short_hash())
}

/// Render a worktree as a section with its details beneath.
pub fn render_record(output: &dyn Output, record: &WorktreeRecord) -> Result<()> {
    let section = output
        .section(&record.path.display().to_string())
        .map_err(map_output_error)?;

    emit(section.item("branch", branch_label(record)))?;
    emit(section.item("commit", &commit_summary(record)))?;
    if let Some(created) = record.created_at {
        emit(section.item("created", &created.format("%Y-%m-%d %H:%M UTC").to_string()))?;
    }

    if record.is_locked {
        emit(section.warn("locked"))?;
    }
    if record.is_dirty {
        emit(section.warn("uncommitted changes"))?;
    }
    if record.is_main {
        emit(section.success("main worktree"))?;
    } else if !record.is_locked && !record.is_dirty {
        emit(section.success("clean"))?;
    }

    Ok(())
}
