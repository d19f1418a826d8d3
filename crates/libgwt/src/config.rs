use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GwtError, Result};

/// Editor preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor used when none is given on the command line.
    pub default: Option<String>,
    /// Editors to try, in order, when nothing else is configured.
    pub fallback: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default: None,
            fallback: vec!["vim".to_string(), "nano".to_string(), "code".to_string()],
        }
    }
}

/// Where new worktrees go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for new worktrees; the branch name is appended.
    pub base: Option<PathBuf>,
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Whether colored output is allowed when writing to a terminal.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// How git is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Program name or path of the git executable.
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

/// Complete gwt configuration, as read from `~/.gwt.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor preferences.
    pub editor: EditorConfig,
    /// Worktree placement.
    pub paths: PathsConfig,
    /// Display preferences.
    pub display: DisplayConfig,
    /// Git invocation.
    pub git: GitConfig,
}

impl Config {
    /// File name of the per-user configuration file in the home directory.
    pub const FILE_NAME: &'static str = ".gwt.toml";

    /// Keys accepted by [`Config::get`] and [`Config::set`].
    pub const KEYS: [&'static str; 5] = [
        "editor.default",
        "editor.fallback",
        "paths.base",
        "display.color",
        "git.program",
    ];

    /// Default configuration file location, `~/.gwt.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(Self::FILE_NAME))
    }

    /// Load configuration from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            GwtError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&contents).map_err(|e| {
            GwtError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Persist configuration to `path`, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let encoded = toml::to_string(self)
            .map_err(|e| GwtError::Config(format!("Failed to encode config: {e}")))?;
        fs::write(path, encoded).map_err(|e| {
            GwtError::Config(format!("Failed to write config file {}: {e}", path.display()))
        })?;
        Ok(())
    }

    /// Read a value by dotted key; `None` when the key is known but unset.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "editor.default" => self.editor.default.clone(),
            "editor.fallback" => Some(self.editor.fallback.join(",")),
            "paths.base" => self.paths.base.as_ref().map(|p| p.display().to_string()),
            "display.color" => Some(self.display.color.to_string()),
            "git.program" => Some(self.git.program.clone()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "editor.default" => self.editor.default = non_empty(value),
            "editor.fallback" => {
                self.editor.fallback = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "paths.base" => self.paths.base = non_empty(value).map(PathBuf::from),
            "display.color" => {
                self.display.color = value.parse().map_err(|_| {
                    GwtError::Config(format!("display.color expects true or false, got '{value}'"))
                })?;
            }
            "git.program" => {
                if value.is_empty() {
                    return Err(GwtError::Config("git.program cannot be empty".to_string()));
                }
                self.git.program = value.to_string();
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// All keys with their current values, in [`Config::KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).ok().flatten()))
            .collect()
    }
}

/// Map empty strings to `None`.
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Error for a key outside [`Config::KEYS`].
fn unknown_key(key: &str) -> GwtError {
    GwtError::Config(format!(
        "Unknown config key '{key}' (known keys: {})",
        Config::KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = Config::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.git.program, "git");
        assert!(config.display.color);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("gwt.toml");
        fs::write(&path, "[editor]\ndefault = \"nvim\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.editor.default.as_deref(), Some("nvim"));
        assert_eq!(config.editor.fallback, ["vim", "nano", "code"]);
        assert_eq!(config.paths.base, None);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("gwt.toml");
        fs::write(&path, "editor = [").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, GwtError::Config(_)));
    }

    #[test]
    fn set_then_save_and_reload() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("gwt.toml");

        let mut config = Config::default();
        config.set("editor.default", "code").unwrap();
        config.set("paths.base", "/srv/worktrees").unwrap();
        config.set("editor.fallback", "nvim, nano").unwrap();
        config.set("display.color", "false").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.get("paths.base").unwrap().as_deref(),
            Some("/srv/worktrees")
        );
        assert_eq!(
            loaded.get("editor.fallback").unwrap().as_deref(),
            Some("nvim,nano")
        );
    }

    #[test]
    fn unknown_and_invalid_values_are_rejected() {
        let mut config = Config::default();
        assert!(config.get("editor.colour").is_err());
        assert!(config.set("nope", "x").is_err());
        assert!(config.set("display.color", "maybe").is_err());
        assert!(config.set("git.program", "  ").is_err());
    }

    #[test]
    fn empty_value_clears_optional_key() {
        let mut config = Config::default();
        config.set("editor.default", "vim").unwrap();
        config.set("editor.default", "").unwrap();
        assert_eq!(config.get("editor.default").unwrap(), None);
    }

    #[test]
    fn entries_cover_every_key() {
        let entries = Config::default().entries();
        let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, Config::KEYS);
    }
}
