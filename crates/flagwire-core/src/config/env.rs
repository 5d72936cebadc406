//! Environment variable settings source

use std::env;

use super::traits::{SettingsSource, ConfigResult};

/// Settings read from the process environment
///
/// `Section:Key` paths use `__` as the separator, the convention hosts use
/// when they project hierarchical settings onto environment variables.
/// `LaunchDarkly:SdkKey` is looked up as `LaunchDarkly__SdkKey`, then as
/// `LAUNCHDARKLY__SDKKEY`. An optional prefix is prepended to both.
///
/// This source is read-only and never caches, so it sees changes to the
/// environment immediately.
#[derive(Debug, Clone, Default)]
pub struct EnvSettingsSource {
    prefix: Option<String>,
}

impl EnvSettingsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consider variables starting with `prefix` (e.g. `MYAPP_`)
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }

    /// Environment variable names tried for `key`, in order
    pub fn candidates(&self, key: &str) -> Vec<String> {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let path = key.replace(':', "__");
        let exact = format!("{prefix}{path}");
        let upper = format!("{prefix}{}", path.to_ascii_uppercase());
        if exact == upper {
            vec![exact]
        } else {
            vec![exact, upper]
        }
    }
}

impl SettingsSource for EnvSettingsSource {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self
            .candidates(key)
            .into_iter()
            .find_map(|name| env::var(name).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        let source = EnvSettingsSource::new();
        assert_eq!(
            source.candidates("LaunchDarkly:SdkKey"),
            vec!["LaunchDarkly__SdkKey".to_string(), "LAUNCHDARKLY__SDKKEY".to_string()]
        );

        let prefixed = EnvSettingsSource::with_prefix("APP_");
        assert_eq!(prefixed.candidates("A:B"), vec!["APP_A__B".to_string()]);
    }

    #[test]
    fn test_env_source_get() {
        env::set_var("FLAGWIRE_TEST_SECTION__POLLINGINTERVALSECONDS", "30");

        let source = EnvSettingsSource::with_prefix("FLAGWIRE_TEST_");
        assert_eq!(
            source.get("Section:PollingIntervalSeconds").unwrap().as_deref(),
            Some("30")
        );
        assert_eq!(source.get("Section:Missing").unwrap(), None);

        env::remove_var("FLAGWIRE_TEST_SECTION__POLLINGINTERVALSECONDS");
    }
}
