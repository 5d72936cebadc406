//! Process-wide debug log file
//!
//! The factory falls back to this sink when the caller does not supply one.
//! Disabled unless `FLAGWIRE_DEBUG` is `1`/`true`. `FLAGWIRE_LOG_LEVEL` sets
//! the threshold and `FLAGWIRE_LOG_FILE` overrides the location
//! (default: `<tmp>/flagwire-debug.log`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

use super::traits::{Logger, LogLevel};

struct FileLogState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLogState {
    fn from_env() -> Self {
        let enabled = std::env::var("FLAGWIRE_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("FLAGWIRE_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);
        let file = if enabled { open_append(&log_file_path()) } else { None };

        Self { file, min_level, enabled }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp(), level, module, message);
            let _ = file.flush();
        }
    }
}

fn open_append(path: &Path) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

// HH:MM:SS.mmm (UTC), enough to correlate with other process output
fn timestamp() -> String {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs % 86_400) / 3_600,
                (secs % 3_600) / 60,
                secs % 60,
                d.subsec_millis()
            )
        }
        Err(_) => "??:??:??.???".to_string(),
    }
}

static STATE: OnceLock<Mutex<FileLogState>> = OnceLock::new();

fn state() -> &'static Mutex<FileLogState> {
    STATE.get_or_init(|| Mutex::new(FileLogState::from_env()))
}

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    if let Ok(mut state) = state().lock() {
        state.write(level, module, message);
    }
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

/// Debug-file macro tagged with the calling module
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::debug(module_path!(), &format!($($arg)*))
    };
}

/// Path of the debug log file
pub fn log_file_path() -> PathBuf {
    match std::env::var_os("FLAGWIRE_LOG_FILE") {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => std::env::temp_dir().join("flagwire-debug.log"),
    }
}

/// [`Logger`] adapter over the debug file
///
/// Used by the factory when the caller passes no sink of its own.
#[derive(Debug, Clone)]
pub struct FileLogger {
    module: &'static str,
}

impl FileLogger {
    pub fn new(module: &'static str) -> Self {
        Self { module }
    }
}

impl Default for FileLogger {
    fn default() -> Self {
        Self::new("flagwire")
    }
}

impl Logger for FileLogger {
    fn log(&self, level: LogLevel, message: &str) {
        log(level, self.module, message);
    }
}
