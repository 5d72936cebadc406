//! In-memory settings source

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SettingsSource, ConfigResult};

/// In-memory settings for tests and for hosts that already hold their
/// configuration in a map
///
/// Keys are matched case-insensitively.
///
/// # Example
///
/// ```
/// use flagwire_core::config::{MemorySettingsSource, SettingsSource};
///
/// let source = MemorySettingsSource::from_pairs([("LaunchDarkly:SdkKey", "sdk-123")]);
/// assert_eq!(source.get("launchdarkly:sdkkey").unwrap().as_deref(), Some("sdk-123"));
/// ```
#[derive(Debug, Default)]
pub struct MemorySettingsSource {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettingsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with initial key/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), v.into()))
            .collect();
        Self { values: RwLock::new(values) }
    }

    /// Set (or replace) a value
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values.write().insert(normalize(key), value.into());
    }

    /// Remove a value, returning whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.values.write().remove(&normalize(key)).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

impl SettingsSource for MemorySettingsSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.values.read().get(&normalize(key)).cloned())
    }
}
