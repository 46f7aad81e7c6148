//! Command-line argument parsing.

use anyhow::{Context, Result};
use clap::Parser;
use specflow_core::AppSettings;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "SpecFlow")]
#[command(about = "Real-time microphone spectrogram", long_about = None)]
pub struct Args {
    /// Settings file (TOML). Defaults to the platform config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Draw a generated sweep instead of listening to the microphone
    #[arg(long)]
    pub synthetic: bool,

    /// Input device name (see --list-devices)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the available input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Args {
    /// Settings file to read
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(AppSettings::default_path)
    }

    /// Let command-line flags win over the settings file
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(device) = &self.device {
            settings.capture.device_name = Some(device.clone());
        }
        if let Some(level) = &self.log_level {
            settings.log_config.level = level.clone();
        }
    }

    /// Save `settings` where they will be read from next time
    pub fn write_settings(&self, settings: &AppSettings) -> Result<PathBuf> {
        let path = self
            .settings_path()
            .context("No config directory on this platform, pass --config")?;
        settings
            .save(&path)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(path)
    }
}
