use crate::grid::config::GridConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stdout.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub grid: GridConfig,
    /// Remove an item from the board when it is dragged off the grid.
    #[serde(default)]
    pub remove_on_drop_outside: bool,
}

impl Settings {
    /// Load settings from disk. A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn path_for(base: impl AsRef<Path>) -> PathBuf {
        let base = base.as_ref();
        if base.is_dir() {
            base.join(SETTINGS_FILE)
        } else {
            base.to_path_buf()
        }
    }
}
