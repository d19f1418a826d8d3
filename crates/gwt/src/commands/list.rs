use std::path::Path;

use anyhow::Result;
use gwt_term::Output;
use libgwt::{WorktreeRecord, WorktreeStore};

use crate::{
    args::ListFormat,
    ui::{branch_label, emit, render_record},
    utils::display_path,
};

/// Run the `gwt list` command logic.
pub fn list(
    store: &WorktreeStore,
    output: &dyn Output,
    format: ListFormat,
    cwd: &Path,
) -> Result<()> {
    let records = store.enumerate()?;

    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        ListFormat::Simple => {
            for line in simple_lines(&records, cwd) {
                println!("{line}");
            }
        }
        ListFormat::Section => {
            let root = store.repository().root().display().to_string();
            emit(output.item("repository", &root))?;
            if records.is_empty() {
                emit(output.message("No worktrees found."))?;
            }
            for record in &records {
                render_record(output, record)?;
            }
        }
    }

    Ok(())
}

/// Aligned `path  branch  status` lines.
fn simple_lines(records: &[WorktreeRecord], cwd: &Path) -> Vec<String> {
    let rows: Vec<(String, &str, &str)> = records
        .iter()
        .map(|r| (display_path(&r.path, cwd), branch_label(r), r.status_label()))
        .collect();
    let path_width = rows.iter().map(|(p, _, _)| p.chars().count()).max().unwrap_or(0);
    let branch_width = rows.iter().map(|(_, b, _)| b.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|(path, branch, status)| {
            format!("{path:<path_width$}  {branch:<branch_width$}  {status}")
        })
        .collect()
}
