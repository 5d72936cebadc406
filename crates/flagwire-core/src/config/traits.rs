//! Settings source trait and the read helpers built on it

use std::sync::Arc;

/// Errors raised by settings sources
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Setting key must not be empty")]
    InvalidKey,

    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {message}")]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// String key/value settings lookup
///
/// Keys are `Section:Key` paths (e.g. `LaunchDarkly:SdkKey`) and are matched
/// case-insensitively by every built-in source.
pub trait SettingsSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Raw value for `key`, `None` if the source does not define it
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Type alias for an Arc-wrapped settings source
pub type SharedSettingsSource = Arc<dyn SettingsSource>;

/// Read an optional setting
///
/// Blank values read as `None`. The literal escape `&amp;` is replaced by `&`
/// so values copied out of XML-style config files keep working.
pub fn read_setting(source: &dyn SettingsSource, key: &str) -> ConfigResult<Option<String>> {
    if key.trim().is_empty() {
        return Err(ConfigError::InvalidKey);
    }
    Ok(source
        .get(key)?
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.replace("&amp;", "&")))
}
