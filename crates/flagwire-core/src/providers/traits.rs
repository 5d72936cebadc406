//! Provider handle and client builder traits

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{
    DEFAULT_POLLING_INTERVAL_SECS, DEFAULT_REPORT_USAGE_BUFFER, DEFAULT_REPORT_USAGE_INTERVAL_SECS,
};
use crate::factory::FactoryResult;
use crate::logging::SharedLogger;

/// Validated configuration handed to a [`ClientBuilder`]
///
/// The factory only ever produces values inside their clamp ranges; building
/// one by hand bypasses that.
#[derive(Clone)]
pub struct ClientConfig {
    /// SDK key used to authenticate with the flag service
    pub sdk_key: String,
    /// How often flag definitions are polled
    pub poll_interval: Duration,
    /// How often queued analytics events are flushed
    pub events_flush_interval: Duration,
    /// Maximum number of analytics events buffered between flushes
    pub events_capacity: usize,
    /// Sink for the client's own diagnostics
    pub logger: Option<SharedLogger>,
}

impl ClientConfig {
    /// Config with the default intervals and capacity
    pub fn new(sdk_key: impl Into<String>) -> Self {
        Self {
            sdk_key: sdk_key.into(),
            poll_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS as u64),
            events_flush_interval: Duration::from_secs(DEFAULT_REPORT_USAGE_INTERVAL_SECS as u64),
            events_capacity: DEFAULT_REPORT_USAGE_BUFFER as usize,
            logger: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_events_flush_interval(mut self, interval: Duration) -> Self {
        self.events_flush_interval = interval;
        self
    }

    pub fn with_events_capacity(mut self, capacity: usize) -> Self {
        self.events_capacity = capacity;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// First and last few characters of the key, for display
    pub fn masked_sdk_key(&self) -> String {
        let chars: Vec<char> = self.sdk_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Display-safe view of this config
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            sdk_key: self.masked_sdk_key(),
            poll_interval_secs: self.poll_interval.as_secs(),
            events_flush_interval_secs: self.events_flush_interval.as_secs(),
            events_capacity: self.events_capacity,
        }
    }
}

/// Serializable, key-masked view of a [`ClientConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub sdk_key: String,
    pub poll_interval_secs: u64,
    pub events_flush_interval_secs: u64,
    pub events_capacity: usize,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("sdk_key", &self.masked_sdk_key())
            .field("poll_interval", &self.poll_interval)
            .field("events_flush_interval", &self.events_flush_interval)
            .field("events_capacity", &self.events_capacity)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Live handle to the feature-flag service
///
/// Evaluation never fails from the caller's point of view: unknown flags,
/// type mismatches and an uninitialised client all yield `default`.
pub trait FeatureFlagProvider: Send + Sync {
    /// Backend name (e.g. "launchdarkly", "mock")
    fn name(&self) -> &str;

    /// Whether the client has received flag data
    fn is_initialized(&self) -> bool;

    fn bool_variation(&self, flag_key: &str, context_key: &str, default: bool) -> bool;

    fn string_variation(&self, flag_key: &str, context_key: &str, default: &str) -> String;

    fn int_variation(&self, flag_key: &str, context_key: &str, default: i64) -> i64;

    /// Push any queued analytics events now
    fn flush(&self) {}

    /// Stop background work; later evaluations return defaults
    fn close(&self) {}
}

/// Type alias for the shared provider handle
pub type SharedFlagProvider = Arc<dyn FeatureFlagProvider>;

/// Turns a [`ClientConfig`] into a provider handle
///
/// This is the seam to the vendor SDK.
pub trait ClientBuilder: Send + Sync {
    fn build(&self, config: ClientConfig) -> FactoryResult<SharedFlagProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("sdk-key");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.events_flush_interval, Duration::from_secs(2));
        assert_eq!(config.events_capacity, 500);
        assert!(config.logger.is_none());
    }

    #[test]
    fn test_debug_masks_key() {
        let config = ClientConfig::new("sdk-0123456789abcdef");
        let printed = format!("{config:?}");
        assert!(printed.contains("sdk-...cdef"));
        assert!(!printed.contains("0123456789"));

        assert_eq!(ClientConfig::new("short").masked_sdk_key(), "*****");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = ClientConfig::new("sdk-0123456789abcdef")
            .with_events_capacity(250)
            .summary();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["sdkKey"], "sdk-...cdef");
        assert_eq!(json["pollIntervalSecs"], 60);
        assert_eq!(json["eventsFlushIntervalSecs"], 2);
        assert_eq!(json["eventsCapacity"], 250);
    }
}
