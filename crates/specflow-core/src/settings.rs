//! Application settings file
//!
//! Stored as TOML in the platform config directory. Every section falls back to
//! its defaults when missing, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{CaptureConfig, ConfigError, SpectrogramConfig};
use crate::logging::LogConfig;

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("Settings I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for [`AppSettings`]
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be encoded
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Everything configurable from the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Spectrogram drawing
    pub spectrogram: SpectrogramConfig,
    /// Microphone and analyser
    pub capture: CaptureConfig,
    /// Logging configuration
    pub log_config: LogConfig,
    /// Initial window width in logical pixels
    pub window_width: u32,
    /// Initial window height in logical pixels
    pub window_height: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            spectrogram: SpectrogramConfig::default(),
            capture: CaptureConfig::default(),
            log_config: LogConfig::default(),
            window_width: 1024,
            window_height: 640,
        }
    }
}

impl AppSettings {
    /// `<config dir>/SpecFlow/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("SpecFlow").join("settings.toml"))
    }

    /// Load and validate settings. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = match fs::read_to_string(path) {
            Ok(text) => toml::from_str::<Self>(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        settings.validate()?;
        info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Write settings as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Validate every section
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.spectrogram.validate()?;
        self.capture.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.toml");

        let mut settings = AppSettings::default();
        settings.spectrogram.high_threshold = 180;
        settings.capture.device_name = Some("USB Mic".to_string());
        settings.window_width = 800;
        settings.save(&path).unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "window_height = 480\n[spectrogram]\nlow_bound_hz = 50.0\n").unwrap();

        let settings = AppSettings::load(&path).unwrap();
        assert_eq!(settings.window_height, 480);
        assert_eq!(settings.spectrogram.low_bound_hz, 50.0);
        assert_eq!(settings.spectrogram.high_bound_hz, 20000.0);
        assert_eq!(settings.capture, CaptureConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[capture]\nfft_size = 1000\n").unwrap();
        assert!(matches!(
            AppSettings::load(&path),
            Err(SettingsError::Invalid(ConfigError::InvalidFftSize(1000)))
        ));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "window_width = \"wide\"").unwrap();
        assert!(matches!(
            AppSettings::load(&path),
            Err(SettingsError::Parse(_))
        ));
    }
}
