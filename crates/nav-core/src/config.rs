// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::Color;

/// Status bar colors, one per input mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub normal: Color,
    pub pane: Color,
    pub tab: Color,
    pub resize: Color,
    pub session: Color,
    pub insert: Color,
    /// Border color of the focused pane
    pub focus: Color,
    /// Border color of unfocused panes and dimmed sidebar text
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            normal: Color::SAGE,
            pane: Color::OCHRE,
            tab: Color::TEAL,
            resize: Color::ROSE,
            session: Color::OLIVE,
            insert: Color::ORANGE,
            focus: Color::OCHRE,
            muted: Color::GRAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session name shown in the sidebar
    pub session_name: String,

    /// Number of tabs created at startup
    pub initial_tabs: usize,

    /// Shell used to run pane commands (invoked as `<shell> -c <command>`)
    pub shell: String,

    /// Seconds a pane command may run before it is killed
    pub command_timeout_secs: u64,

    /// strftime format for the sidebar clock
    pub clock_format: String,

    /// Sidebar width in columns
    pub sidebar_width: u16,

    /// Whether the sidebar is shown at startup
    pub sidebar_visible: bool,

    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_name: "main".to_string(),
            initial_tabs: 3,
            shell: "sh".to_string(),
            command_timeout_secs: 10,
            clock_format: "%H:%M:%S".to_string(),
            sidebar_width: 30,
            sidebar_visible: true,
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Config {
    /// Get the default config file path (~/.config/navbar/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("navbar").join("config.toml"))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }
}
