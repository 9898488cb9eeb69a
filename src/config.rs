use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotesError, Result, DEFAULT_MAX_SUGGESTIONS, DEFAULT_MIN_PREFIX_LEN};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted records
    pub data_dir: PathBuf,

    /// Quiet period after the last keystroke before content is committed (ms)
    pub commit_delay_ms: u64,

    /// Shortest typed prefix that triggers suggestions
    pub min_prefix_len: usize,

    /// Most suggestions offered at once
    pub max_suggestions: usize,

    /// Editor used by `edit --editor`
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".sleeknotes"));

        Self {
            data_dir,
            commit_delay_ms: 1000,
            min_prefix_len: DEFAULT_MIN_PREFIX_LEN,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            editor_command: None,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads the config file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| NotesError::DirectoryError {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_prefix_len == 0 {
            return Err(NotesError::ConfigError {
                message: "min_prefix_len must be at least 1".to_string(),
            });
        }
        if self.max_suggestions == 0 {
            return Err(NotesError::ConfigError {
                message: "max_suggestions must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sleeknotes")
}
