//! Chained settings source with fallback behavior

use std::sync::Arc;

use super::traits::{SettingsSource, ConfigResult};

/// Tries each source in order and returns the first value found
///
/// Errors from a source stop the lookup; a broken settings file is not
/// silently skipped.
///
/// # Example
///
/// ```
/// use flagwire_core::config::{ChainSettingsSource, EnvSettingsSource, MemorySettingsSource, SettingsSource};
/// use std::sync::Arc;
///
/// let overrides: Arc<dyn SettingsSource> =
///     Arc::new(MemorySettingsSource::from_pairs([("LaunchDarkly:Strategy", "STATIC")]));
/// let chain = ChainSettingsSource::new(vec![overrides, Arc::new(EnvSettingsSource::new())]);
/// assert_eq!(chain.get("LaunchDarkly:Strategy").unwrap().as_deref(), Some("STATIC"));
/// ```
pub struct ChainSettingsSource {
    sources: Vec<Arc<dyn SettingsSource>>,
}

impl ChainSettingsSource {
    pub fn new(sources: Vec<Arc<dyn SettingsSource>>) -> Self {
        Self { sources }
    }

    /// Name of the first source that defines `key`
    pub fn find_source(&self, key: &str) -> ConfigResult<Option<&str>> {
        for source in &self.sources {
            if source.get(key)?.is_some() {
                return Ok(Some(source.name()));
            }
        }
        Ok(None)
    }
}

impl SettingsSource for ChainSettingsSource {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        for source in &self.sources {
            if let Some(value) = source.get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for ChainSettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSettingsSource")
            .field("sources", &names)
            .finish()
    }
}
