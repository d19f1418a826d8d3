//! Known editors and how to launch them on a directory.
//!
//! The table maps a canonical command name (plus aliases) to the flags the
//! editor understands. Availability is checked against the search path.

use std::{ffi::OsString, fmt, path::Path};

use tracing::debug;

use crate::{
    config::Config,
    error::{GwtError, Result},
};

/// Launch details for one editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorInfo {
    /// Human-readable name.
    pub name: &'static str,
    /// Executable to run.
    pub command: &'static str,
    /// Alternative names accepted on lookup.
    pub aliases: &'static [&'static str],
    /// Flag that opens a fresh window, when supported.
    pub new_window_flag: Option<&'static str>,
    /// Flag that blocks until the editor closes, when needed.
    pub wait_flag: Option<&'static str>,
}

impl EditorInfo {
    /// Argument list for opening `path`.
    ///
    /// The new-window flag goes first and the wait flag last; flags the editor
    /// lacks are skipped.
    pub fn launch_args(&self, path: &Path, new_window: bool, wait: bool) -> Vec<OsString> {
        let mut args = Vec::new();
        if new_window && let Some(flag) = self.new_window_flag {
            args.push(OsString::from(flag));
        }
        args.push(path.as_os_str().to_os_string());
        if wait && let Some(flag) = self.wait_flag {
            args.push(OsString::from(flag));
        }
        args
    }

    /// Whether `name` refers to this editor.
    pub fn matches(&self, name: &str) -> bool {
        self.command == name || self.aliases.iter().any(|alias| *alias == name)
    }
}

impl fmt::Display for EditorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command)
    }
}

/// Every editor gwt knows how to launch.
static EDITORS: &[EditorInfo] = &[
    EditorInfo {
        name: "Visual Studio Code",
        command: "code",
        aliases: &["vscode", "vs-code"],
        new_window_flag: Some("--new-window"),
        wait_flag: Some("--wait"),
    },
    EditorInfo {
        name: "Vim",
        command: "vim",
        aliases: &["vi"],
        new_window_flag: None,
        wait_flag: None,
    },
    EditorInfo {
        name: "Neovim",
        command: "nvim",
        aliases: &["neovim"],
        new_window_flag: None,
        wait_flag: None,
    },
    EditorInfo {
        name: "Emacs",
        command: "emacs",
        aliases: &[],
        new_window_flag: None,
        wait_flag: None,
    },
    EditorInfo {
        name: "Nano",
        command: "nano",
        aliases: &[],
        new_window_flag: None,
        wait_flag: None,
    },
    EditorInfo {
        name: "Sublime Text",
        command: "subl",
        aliases: &["sublime"],
        new_window_flag: Some("-n"),
        wait_flag: Some("-w"),
    },
    EditorInfo {
        name: "IntelliJ IDEA",
        command: "idea",
        aliases: &["intellij", "jetbrains"],
        new_window_flag: None,
        wait_flag: None,
    },
    EditorInfo {
        name: "WebStorm",
        command: "webstorm",
        aliases: &[],
        new_window_flag: None,
        wait_flag: None,
    },
];

/// Order in which installed editors are tried when the requested one is missing.
const FALLBACK_PRIORITY: [&str; 6] = ["code", "vim", "nvim", "subl", "nano", "emacs"];

/// Last-resort editor name.
const LAST_RESORT: &str = "vi";

/// Predicate reporting whether a command is installed.
type InstalledCheck = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Editor table plus an availability check.
pub struct EditorRegistry {
    /// Reports whether an editor command can be found.
    is_installed: InstalledCheck,
}

impl EditorRegistry {
    /// Registry that checks availability on the search path.
    pub fn new() -> Self {
        Self::with_check(|command| which::which(command).is_ok())
    }

    /// Registry with a custom availability check.
    pub fn with_check(check: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            is_installed: Box::new(check),
        }
    }

    /// Find an editor by command name or alias.
    pub fn lookup(&self, name: &str) -> Option<&'static EditorInfo> {
        EDITORS.iter().find(|editor| editor.matches(name))
    }

    /// Resolve `name` to an installed editor.
    ///
    /// Unknown names fail with [`GwtError::UnknownEditor`]. A known editor that
    /// is not installed falls back to the first installed editor in priority
    /// order, and fails with [`GwtError::EditorUnavailable`] if there is none.
    pub fn detect(&self, name: &str) -> Result<&'static EditorInfo> {
        let editor = self
            .lookup(name)
            .ok_or_else(|| GwtError::UnknownEditor(name.to_string()))?;

        if (self.is_installed)(editor.command) {
            return Ok(editor);
        }

        debug!(editor = editor.command, "editor not installed, trying fallbacks");
        FALLBACK_PRIORITY
            .iter()
            .filter_map(|candidate| self.lookup(candidate))
            .find(|candidate| (self.is_installed)(candidate.command))
            .ok_or_else(|| GwtError::EditorUnavailable(name.to_string()))
    }

    /// Installed editors, in table order.
    pub fn available(&self) -> Vec<&'static EditorInfo> {
        EDITORS
            .iter()
            .filter(|editor| (self.is_installed)(editor.command))
            .collect()
    }

    /// Editor name to use when the caller did not pick one.
    ///
    /// Priority: `editor.default` from `config`, then the first non-empty
    /// entry of `environment` (typically `$EDITOR`, `$VISUAL`), then the
    /// first installed entry of `editor.fallback`, then `vi`. Only the
    /// program word of an environment value is kept (`code --wait` -> `code`).
    pub fn preferred_name(&self, config: &Config, environment: &[Option<String>]) -> String {
        if let Some(name) = config.editor.default.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let from_env = environment
            .iter()
            .flatten()
            .filter_map(|value| value.split_whitespace().next())
            .find_map(|program| {
                Path::new(program)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            });
        if let Some(name) = from_env {
            return name;
        }

        config
            .editor
            .fallback
            .iter()
            .find(|name| (self.is_installed)(name.as_str()))
            .cloned()
            .unwrap_or_else(|| LAST_RESORT.to_string())
    }
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
