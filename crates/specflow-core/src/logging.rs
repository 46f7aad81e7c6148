//! Logging configuration
//!
//! The subscriber itself is installed by the application binary; this module
//! only describes where logs go and at what level.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;

const LOG_FILE_PREFIX: &str = "specflow_";
const LOG_FILE_SUFFIX: &str = ".log";

/// Where and how much to log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name: trace, debug, info, warn, error or off
    pub level: String,
    /// Directory receiving log files
    pub log_path: PathBuf,
    /// Number of log files kept, including the current one
    pub max_files: usize,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a file in `log_path`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: default_log_dir(),
            max_files: 10,
            console_output: true,
            file_output: true,
        }
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("SpecFlow").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Start time of this process, shared by every call to `current_log_path`
fn session_stamp() -> &'static str {
    static STAMP: OnceLock<String> = OnceLock::new();
    STAMP.get_or_init(|| chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string())
}

impl LogConfig {
    /// Level filter for the configured level name. Unknown names fall back to INFO.
    pub fn parse_level(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            "off" => LevelFilter::OFF,
            _ => LevelFilter::INFO,
        }
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Log file for this process run
    pub fn current_log_path(&self) -> PathBuf {
        self.log_path
            .join(format!("{}{}{}", LOG_FILE_PREFIX, session_stamp(), LOG_FILE_SUFFIX))
    }

    /// Delete the oldest log files so that, together with the file about to be
    /// created, at most `max_files` remain.
    pub fn cleanup_old_logs(&self) -> io::Result<()> {
        if !self.log_path.is_dir() {
            return Ok(());
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX)
                    })
            })
            .collect();

        let keep = self.max_files.saturating_sub(1);
        if logs.len() <= keep {
            return Ok(());
        }

        // Timestamps sort lexically
        logs.sort();
        let excess = logs.len() - keep;
        for path in logs.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
