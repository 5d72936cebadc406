//! Typed LaunchDarkly settings and the clamping rules applied to them
//!
//! Settings are loaded once from a [`SettingsSource`] into
//! [`LaunchDarklySettings`]. Numeric values stay as the raw strings that were
//! configured; the `effective_*` functions turn them into values that are
//! always inside their safe range. Malformed numbers fall back to the
//! default and are never reported as errors.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use super::keys;
use super::traits::{read_setting, SettingsSource, ConfigResult};

pub const DEFAULT_POLLING_INTERVAL_SECS: i32 = 60;
pub const MIN_POLLING_INTERVAL_SECS: i32 = 5;

pub const DEFAULT_REPORT_USAGE_INTERVAL_SECS: i32 = 2;
pub const MIN_REPORT_USAGE_INTERVAL_SECS: i32 = 1;
pub const MAX_REPORT_USAGE_INTERVAL_SECS: i32 = 9;

pub const DEFAULT_REPORT_USAGE_BUFFER: i32 = 500;
pub const MIN_REPORT_USAGE_BUFFER: i32 = 100;

/// Credential value meaning "read the real key from a local file"
pub const LOCAL_SDK_KEY_SENTINEL: &str = "LOCAL";

/// How the factory hands out provider handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Build once, then return the cached handle on every call
    Static,
    /// Build a fresh handle on every call
    #[default]
    PerCall,
}

impl Strategy {
    /// `STATIC` (any case, no surrounding whitespace) selects
    /// [`Strategy::Static`]; anything else, including an absent value,
    /// selects [`Strategy::PerCall`]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("STATIC") => Strategy::Static,
            _ => Strategy::PerCall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Static => "STATIC",
            Strategy::PerCall => "PER_CALL",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer parse with default substitution; surrounding whitespace and a
/// leading sign are accepted, anything else (including overflow) is not
fn parse_or(raw: Option<&str>, default: i32) -> i32 {
    raw.and_then(|v| v.trim().parse::<i32>().ok()).unwrap_or(default)
}

/// Polling interval: default 60s, at least 5s
pub fn effective_polling_interval(raw: Option<&str>) -> Duration {
    let secs = parse_or(raw, DEFAULT_POLLING_INTERVAL_SECS).max(MIN_POLLING_INTERVAL_SECS);
    Duration::from_secs(secs as u64)
}

/// Usage-report flush interval: default 2s, clamped to 1..=9s
///
/// The floor is applied before the ceiling.
pub fn effective_report_usage_interval(raw: Option<&str>) -> Duration {
    let secs = parse_or(raw, DEFAULT_REPORT_USAGE_INTERVAL_SECS)
        .max(MIN_REPORT_USAGE_INTERVAL_SECS)
        .min(MAX_REPORT_USAGE_INTERVAL_SECS);
    Duration::from_secs(secs as u64)
}

/// Usage-report buffer capacity: default 500, at least 100
pub fn effective_report_usage_buffer(raw: Option<&str>) -> usize {
    parse_or(raw, DEFAULT_REPORT_USAGE_BUFFER).max(MIN_REPORT_USAGE_BUFFER) as usize
}

/// Raw LaunchDarkly settings, read once from a settings source
///
/// Every field is the configured string (blank values read as `None`).
/// `Debug` never prints the SDK key.
///
/// Also deserializes straight from a `LaunchDarkly` section of a YAML or
/// JSON document; numeric and boolean scalars are kept as their text.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LaunchDarklySettings {
    #[serde(deserialize_with = "scalar_setting")]
    pub strategy: Option<String>,
    #[serde(deserialize_with = "scalar_setting")]
    pub sdk_key: Option<String>,
    #[serde(deserialize_with = "scalar_setting")]
    pub local_key_path: Option<String>,
    #[serde(deserialize_with = "scalar_setting")]
    pub polling_interval_seconds: Option<String>,
    #[serde(deserialize_with = "scalar_setting")]
    pub report_usage_interval: Option<String>,
    #[serde(deserialize_with = "scalar_setting")]
    pub report_usage_buffer_size: Option<String>,
}

fn scalar_setting<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(text.replace("&amp;", "&")))
}

impl LaunchDarklySettings {
    /// Read every `LaunchDarkly:*` key from `source`
    pub fn load(source: &dyn SettingsSource) -> ConfigResult<Self> {
        Ok(Self {
            strategy: read_setting(source, keys::STRATEGY)?,
            sdk_key: read_setting(source, keys::SDK_KEY)?,
            local_key_path: read_setting(source, keys::LOCAL_KEY_PATH)?,
            polling_interval_seconds: read_setting(source, keys::POLLING_INTERVAL_SECONDS)?,
            report_usage_interval: read_setting(source, keys::REPORT_USAGE_INTERVAL)?,
            report_usage_buffer_size: read_setting(source, keys::REPORT_USAGE_BUFFER_SIZE)?,
        })
    }

    /// Settings with just a credential, everything else defaulted
    pub fn with_sdk_key(sdk_key: impl Into<String>) -> Self {
        Self {
            sdk_key: Some(sdk_key.into()),
            ..Self::default()
        }
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::from_setting(self.strategy.as_deref())
    }

    /// Whether the credential is the `LOCAL` sentinel (any case)
    pub fn uses_local_key(&self) -> bool {
        self.sdk_key
            .as_deref()
            .map(|k| k.eq_ignore_ascii_case(LOCAL_SDK_KEY_SENTINEL))
            .unwrap_or(false)
    }

    pub fn polling_interval(&self) -> Duration {
        effective_polling_interval(self.polling_interval_seconds.as_deref())
    }

    pub fn report_usage_interval(&self) -> Duration {
        effective_report_usage_interval(self.report_usage_interval.as_deref())
    }

    pub fn report_usage_buffer(&self) -> usize {
        effective_report_usage_buffer(self.report_usage_buffer_size.as_deref())
    }
}

impl fmt::Debug for LaunchDarklySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sdk_key = match self.sdk_key.as_deref() {
            None => "<unset>",
            Some(_) if self.uses_local_key() => LOCAL_SDK_KEY_SENTINEL,
            Some(_) => "<redacted>",
        };
        f.debug_struct("LaunchDarklySettings")
            .field("strategy", &self.strategy)
            .field("sdk_key", &sdk_key)
            .field("local_key_path", &self.local_key_path)
            .field("polling_interval_seconds", &self.polling_interval_seconds)
            .field("report_usage_interval", &self.report_usage_interval)
            .field("report_usage_buffer_size", &self.report_usage_buffer_size)
            .finish()
    }
}
