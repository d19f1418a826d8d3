use std::path::Path;

use anyhow::Result;
use gwt_term::Output;
use libgwt::Config;

use crate::{args::ConfigAction, ui::emit};

/// Placeholder printed for keys without a value.
const UNSET: &str = "(unset)";

/// Run the `gwt config` command logic against the file at `path`.
pub fn config(
    output: &dyn Output,
    path: &Path,
    mut config: Config,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key)? {
                println!("{value}");
            }
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save(path)?;
            let shown = config.get(&key)?.unwrap_or_else(|| UNSET.to_string());
            emit(output.success(&format!("{key} = {shown}")))?;
        }
        ConfigAction::List => {
            emit(output.message(&format!("Config file: {}", path.display())))?;
            for (key, value) in config.entries() {
                emit(output.item(key, value.as_deref().unwrap_or(UNSET)))?;
            }
        }
    }
    Ok(())
}
