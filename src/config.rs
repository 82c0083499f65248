//! Configuration management for Keystroke Timing
//!
//! Provides persistent configuration that is automatically saved to and loaded
//! from a platform-specific config file.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keystroke-timing/config.toml` |
//! | macOS | `~/Library/Application Support/keystroke-timing/config.toml` |
//! | Windows | `%APPDATA%\keystroke-timing\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keystroke_timing::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Record 3-key contexts instead of 5
//! config.timing.context_k = 3;
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use crate::timing::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "keystroke-timing";

/// Fewest prompts a session may ask for
pub const MIN_LINES_TO_TYPE: usize = 5;

/// Most prompts a session may ask for
pub const MAX_LINES_TO_TYPE: usize = 15;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join(APP_DIR);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Directory for logs and default exports (`<data_local_dir>/keystroke-timing`)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Keystroke timing thresholds
    #[serde(default)]
    pub timing: TimingConfig,
    /// Session length and prompt source
    #[serde(default)]
    pub session: SessionConfig,
    /// Export target and shape
    #[serde(default)]
    pub export: ExportConfig,
    /// UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Keystroke timing configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Burst-split threshold: gaps at or above this start a new burst
    pub gap_ms: u64,
    /// Hard cap: gaps above this are discarded
    pub max_ms: u64,
    /// Longest context recorded before a key
    pub context_k: usize,
    /// Skip every n-gram whose context or key is the submit key
    pub exclude_submit_key: bool,
    /// Record dwell and flight times alongside n-grams
    pub capture_dwell_flight: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gap_ms: 1000,
            max_ms: 1500,
            context_k: 5,
            exclude_submit_key: true,
            capture_dwell_flight: true,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Prompts per session
    pub lines_to_type: usize,
    /// Newline-delimited prompt file, bundled sentences when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lines_to_type: 10,
            prompts_file: None,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Target directory, current directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// File name of the timing export
    pub filename: String,
    /// JSON shape of the timing export
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            filename: "typing-pair-timings.json".to_string(),
            format: ExportFormat::Full,
        }
    }
}

impl ExportConfig {
    /// Directory exports are written to
    pub fn target_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// Color theme (dark/light)
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            theme: Theme::Dark,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check thresholds and bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.gap_ms == 0 || timing.max_ms == 0 {
            return Err(ConfigError::Invalid(
                "gap_ms and max_ms must be greater than zero".to_string(),
            ));
        }
        if timing.context_k == 0 {
            return Err(ConfigError::Invalid("context_k must be at least 1".to_string()));
        }
        let lines = self.session.lines_to_type;
        if !(MIN_LINES_TO_TYPE..=MAX_LINES_TO_TYPE).contains(&lines) {
            return Err(ConfigError::Invalid(format!(
                "lines_to_type must be between {} and {}, got {}",
                MIN_LINES_TO_TYPE, MAX_LINES_TO_TYPE, lines
            )));
        }
        if self.export.filename.trim().is_empty() {
            return Err(ConfigError::Invalid("export filename is empty".to_string()));
        }
        if self.ui.refresh_rate_hz == 0 {
            return Err(ConfigError::Invalid("refresh_rate_hz must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ui.refresh_rate_hz.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path() -> PathBuf {
        env::temp_dir().join(format!("keystroke-timing-test-{}.toml", std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.timing.gap_ms, 1000);
        assert_eq!(config.timing.max_ms, 1500);
        assert_eq!(config.timing.context_k, 5);
        assert!(config.timing.exclude_submit_key);
        assert!(config.timing.capture_dwell_flight);
        assert_eq!(config.session.lines_to_type, 10);
        assert_eq!(config.export.filename, "typing-pair-timings.json");
        assert_eq!(config.export.format, ExportFormat::Full);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_refresh_interval() {
        let config = Config::default();
        // 60 Hz = 16666 microseconds per frame
        assert_eq!(config.refresh_interval().as_micros(), 16666);
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path();

        let mut config = Config::default();
        config.timing.context_k = 3;
        config.timing.exclude_submit_key = false;
        config.session.lines_to_type = 7;
        config.export.format = ExportFormat::Minimal;
        config.ui.theme = Theme::Light;

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_error() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_deserializes_partial_toml() {
        let toml_str = r#"
[timing]
gap_ms = 800
max_ms = 1200
context_k = 2
exclude_submit_key = false
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.timing.gap_ms, 800);
        assert_eq!(config.timing.max_ms, 1200);
        assert_eq!(config.timing.context_k, 2);
        assert!(!config.timing.exclude_submit_key);
        assert!(config.timing.capture_dwell_flight);
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn config_serializes_sections() {
        let toml_str = toml::to_string_pretty(&Config::default()).expect("Failed to serialize");
        assert!(toml_str.contains("[timing]"));
        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[export]"));
        assert!(toml_str.contains("format = \"full\""));
        assert!(toml_str.contains("gap_ms = 1000"));
    }

    #[test]
    fn validation_rejects_out_of_range_lines() {
        let mut config = Config::default();
        config.session.lines_to_type = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.session.lines_to_type = 16;
        assert!(config.validate().is_err());
        config.session.lines_to_type = 15;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_zero_thresholds() {
        let mut config = Config::default();
        config.timing.context_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timing.gap_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");

        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }

    #[test]
    fn export_dir_defaults_to_current() {
        assert_eq!(ExportConfig::default().target_dir(), PathBuf::from("."));
    }
}
