//! Configuration for clayterm.
//!
//! Settings are read from `~/.clayterm/config.toml`. Every field is
//! optional; a missing or unreadable file means defaults throughout.
//!
//! ```toml
//! # Frames per second of the render loop
//! target_fps = 30
//!
//! # Size used when the terminal does not report one
//! fallback_cols = 80
//! fallback_rows = 24
//!
//! # Honor per-side border widths instead of always drawing a full box
//! border_sides = false
//!
//! # Draw on the alternate screen and hide the cursor while running
//! alternate_screen = false
//!
//! # trace, debug, info, warn, error (or any tracing filter directive)
//! log_level = "info"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerOptions;
use crate::ui::interpreter::BorderMode;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target_fps: u32,
    pub fallback_cols: u16,
    pub fallback_rows: u16,
    /// Per-side borders
    pub border_sides: bool,
    pub alternate_screen: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_fps: 30,
            fallback_cols: 80,
            fallback_rows: 24,
            border_sides: false,
            alternate_screen: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = Self::parse(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Directory holding the config file and the log
    pub fn config_dir() -> Option<PathBuf> {
        let dir = home_dir()?.join(".clayterm");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn border_mode(&self) -> BorderMode {
        if self.border_sides {
            BorderMode::PerSide
        } else {
            BorderMode::FullBox
        }
    }

    /// Scheduler settings derived from this configuration
    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            target_fps: self.target_fps.max(1),
            fallback_size: (self.fallback_cols.max(1), self.fallback_rows.max(1)),
            frame_limit: None,
            border_mode: self.border_mode(),
        }
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("target_fps = 5\nborder_sides = true\n").unwrap();
        assert_eq!(config.target_fps, 5);
        assert!(config.border_sides);
        assert_eq!(config.fallback_cols, 80);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.border_mode(), BorderMode::PerSide);
    }

    #[test]
    fn test_invalid_file() {
        assert!(Config::parse("target_fps = \"fast\"").is_err());
    }

    #[test]
    fn test_scheduler_options() {
        let config = Config {
            target_fps: 0,
            fallback_cols: 0,
            fallback_rows: 40,
            ..Config::default()
        };
        let options = config.scheduler_options();
        assert_eq!(options.target_fps, 1);
        assert_eq!(options.fallback_size, (1, 40));
        assert_eq!(options.border_mode, BorderMode::FullBox);
        assert_eq!(options.frame_limit, None);
    }

    #[test]
    fn test_serialized_form_parses_back() {
        let config = Config {
            alternate_screen: true,
            log_level: "debug".to_string(),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
