//! Provider factory
//!
//! Reads the `LaunchDarkly:*` settings, resolves the SDK key, clamps the
//! tunables and hands the result to a [`ClientBuilder`]. Under the `STATIC`
//! strategy the first successfully built handle is kept in a
//! [`ProviderCache`] and returned on every later call.
//!
//! ```
//! use std::sync::Arc;
//! use flagwire_core::config::MemorySettingsSource;
//! use flagwire_core::factory::ProviderFactory;
//! use flagwire_core::providers::MockClientBuilder;
//!
//! let settings = MemorySettingsSource::from_pairs([
//!     ("LaunchDarkly:Strategy", "STATIC"),
//!     ("LaunchDarkly:SdkKey", "sdk-123"),
//! ]);
//! let factory = ProviderFactory::new(Arc::new(settings), Arc::new(MockClientBuilder::new()));
//!
//! let first = factory.create(None, None).unwrap();
//! let second = factory.create(None, None).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

mod error;
mod cache;
pub mod credentials;

pub use error::{FactoryError, FactoryResult};
pub use cache::ProviderCache;
pub use credentials::{resolve_sdk_key, read_local_key, KeySource};

use std::path::Path;
use std::sync::Arc;

use crate::config::{keys, read_setting, LaunchDarklySettings, SharedSettingsSource, Strategy};
use crate::logging::{FileLogger, Logger, SharedLogger};
use crate::providers::{ClientBuilder, ClientConfig, SharedFlagProvider};

/// Validate `settings` and turn them into a [`ClientConfig`]
///
/// Runs every construction step short of calling the builder: mandatory key
/// check, local key file resolution and clamping. The logger, if any, is
/// attached to the returned config.
pub fn build_client_config(
    settings: &LaunchDarklySettings,
    local_key_path: Option<&Path>,
    logger: Option<SharedLogger>,
) -> FactoryResult<(ClientConfig, KeySource)> {
    let raw_key = settings
        .sdk_key
        .as_deref()
        .ok_or_else(|| FactoryError::missing_key(keys::SDK_KEY))?;

    let (sdk_key, key_source) =
        resolve_sdk_key(raw_key, local_key_path, settings.local_key_path.as_deref())?;

    let mut config = ClientConfig::new(sdk_key)
        .with_poll_interval(settings.polling_interval())
        .with_events_flush_interval(settings.report_usage_interval())
        .with_events_capacity(settings.report_usage_buffer());
    if let Some(logger) = logger {
        config = config.with_logger(logger);
    }

    Ok((config, key_source))
}

/// Produces feature-flag provider handles according to the configured strategy
pub struct ProviderFactory {
    source: SharedSettingsSource,
    builder: Arc<dyn ClientBuilder>,
    cache: Arc<ProviderCache>,
}

impl ProviderFactory {
    /// Factory with its own, initially empty cache
    pub fn new(source: SharedSettingsSource, builder: Arc<dyn ClientBuilder>) -> Self {
        Self::with_cache(source, builder, Arc::new(ProviderCache::new()))
    }

    /// Factory sharing `cache` with whoever else holds it
    pub fn with_cache(
        source: SharedSettingsSource,
        builder: Arc<dyn ClientBuilder>,
        cache: Arc<ProviderCache>,
    ) -> Self {
        Self { source, builder, cache }
    }

    pub fn cache(&self) -> &Arc<ProviderCache> {
        &self.cache
    }

    /// Get a provider handle
    ///
    /// With `LaunchDarkly:Strategy` = `STATIC` the cached handle is returned
    /// without reading any other setting. Otherwise all settings are read and
    /// a handle is built (and cached, for `STATIC`).
    ///
    /// `local_key_path` overrides `LaunchDarkly:LocalKeyPath` when the SDK key
    /// is `LOCAL`. `logger` is forwarded to the built provider.
    pub fn create(
        &self,
        local_key_path: Option<&Path>,
        logger: Option<SharedLogger>,
    ) -> FactoryResult<SharedFlagProvider> {
        let raw_strategy = read_setting(self.source.as_ref(), keys::STRATEGY)?;
        let strategy = Strategy::from_setting(raw_strategy.as_deref());
        if strategy == Strategy::Static {
            if let Some(provider) = self.cache.get() {
                diagnostics(logger.as_ref()).debug("Returning cached feature flag provider");
                return Ok(provider);
            }
        }

        let settings = LaunchDarklySettings::load(self.source.as_ref())?;
        self.create_from_settings(&settings, local_key_path, logger)
    }

    /// Same as [`create`](Self::create), driven by already-loaded settings
    pub fn create_from_settings(
        &self,
        settings: &LaunchDarklySettings,
        local_key_path: Option<&Path>,
        logger: Option<SharedLogger>,
    ) -> FactoryResult<SharedFlagProvider> {
        match settings.strategy() {
            Strategy::Static => self
                .cache
                .get_or_try_init(|| self.build(settings, local_key_path, logger)),
            Strategy::PerCall => self.build(settings, local_key_path, logger),
        }
    }

    /// The configuration a fresh build would use, without building
    pub fn effective_config(&self, local_key_path: Option<&Path>) -> FactoryResult<(ClientConfig, KeySource)> {
        let settings = LaunchDarklySettings::load(self.source.as_ref())?;
        build_client_config(&settings, local_key_path, None)
    }

    fn build(
        &self,
        settings: &LaunchDarklySettings,
        local_key_path: Option<&Path>,
        logger: Option<SharedLogger>,
    ) -> FactoryResult<SharedFlagProvider> {
        let log = diagnostics(logger.as_ref());
        let (config, key_source) = build_client_config(settings, local_key_path, logger)?;

        if let KeySource::LocalFile(path) = &key_source {
            log.info(&format!("Using LaunchDarkly SDK key from local file {}", path.display()));
        }
        log.debug(&format!(
            "Building feature flag provider (strategy: {}, poll: {}s, flush: {}s, capacity: {})",
            settings.strategy(),
            config.poll_interval.as_secs(),
            config.events_flush_interval.as_secs(),
            config.events_capacity
        ));

        let provider = self.builder.build(config);
        if let Err(e) = &provider {
            log.error(&format!("Failed to build feature flag provider: {e}"));
        }
        provider
    }
}

/// Caller's sink if given, the debug file otherwise
fn diagnostics(logger: Option<&SharedLogger>) -> SharedLogger {
    match logger {
        Some(logger) => Arc::clone(logger),
        None => Arc::new(FileLogger::new("flagwire::factory")),
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("source", &self.source.name())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tempfile::tempdir;

    use crate::config::MemorySettingsSource;
    use crate::logging::{LogLevel, NoOpLogger};
    use crate::providers::MockClientBuilder;

    fn factory_with(pairs: &[(&str, &str)]) -> (ProviderFactory, Arc<MemorySettingsSource>, Arc<MockClientBuilder>) {
        let source = Arc::new(MemorySettingsSource::from_pairs(pairs.iter().copied()));
        let builder = Arc::new(MockClientBuilder::new());
        let factory = ProviderFactory::new(source.clone(), builder.clone());
        (factory, source, builder)
    }

    #[derive(Default)]
    struct RecordingLogger(Mutex<Vec<(LogLevel, String)>>);

    impl Logger for RecordingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().push((level, message.to_string()));
        }
    }

    #[test]
    fn test_static_strategy_returns_same_handle() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]);

        let first = factory.create(None, None).unwrap();
        let second = factory.create(None, None).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.build_count(), 1);
        assert!(factory.cache().is_initialized());
    }

    #[test]
    fn test_static_strategy_is_case_insensitive() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:Strategy", "static"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]);

        let first = factory.create(None, None).unwrap();
        let second = factory.create(None, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.build_count(), 1);
    }

    #[test]
    fn test_other_strategies_build_fresh_handles() {
        for strategy in [Some("NEW"), Some("dynamic"), None] {
            let mut pairs = vec![("LaunchDarkly:SdkKey", "sdk-123")];
            if let Some(s) = strategy {
                pairs.push(("LaunchDarkly:Strategy", s));
            }
            let (factory, _, builder) = factory_with(&pairs);

            let first = factory.create(None, None).unwrap();
            let second = factory.create(None, None).unwrap();

            assert!(!Arc::ptr_eq(&first, &second), "{strategy:?}");
            assert_eq!(builder.build_count(), 2);
            assert!(!factory.cache().is_initialized());
        }
    }

    #[test]
    fn test_cached_handle_ignores_later_config_changes() {
        let (factory, source, builder) = factory_with(&[
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-first"),
        ]);

        let first = factory.create(None, None).unwrap();
        source.set("LaunchDarkly:SdkKey", "sdk-second");
        source.set("LaunchDarkly:PollingIntervalSeconds", "120");
        let second = factory.create(Some(Path::new("/elsewhere")), None).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.last_config().unwrap().sdk_key, "sdk-first");
    }

    #[test]
    fn test_cache_hit_skips_other_settings() {
        let (factory, source, _) = factory_with(&[
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]);
        factory.create(None, None).unwrap();

        // The key is gone, but the cached handle is still served
        source.remove("LaunchDarkly:SdkKey");
        assert!(factory.create(None, None).is_ok());
    }

    #[test]
    fn test_missing_sdk_key() {
        let (factory, _, builder) = factory_with(&[]);
        let err = factory.create(None, None).err().unwrap();
        assert!(matches!(err, FactoryError::MissingConfigurationKey { ref key } if key == "LaunchDarkly:SdkKey"));
        assert_eq!(builder.build_count(), 0);
    }

    #[test]
    fn test_blank_sdk_key_is_missing() {
        let (factory, _, _) = factory_with(&[("LaunchDarkly:SdkKey", "   ")]);
        assert!(matches!(
            factory.create(None, None),
            Err(FactoryError::MissingConfigurationKey { .. })
        ));
    }

    #[test]
    fn test_local_key_without_any_path() {
        let (factory, _, _) = factory_with(&[("LaunchDarkly:SdkKey", "LOCAL")]);
        assert!(matches!(
            factory.create(None, None),
            Err(FactoryError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_local_key_with_missing_file() {
        let dir = tempdir().unwrap();
        let (factory, _, _) = factory_with(&[("LaunchDarkly:SdkKey", "LOCAL")]);

        let missing = dir.path().join("ld.key");
        assert!(matches!(
            factory.create(Some(&missing), None),
            Err(FactoryError::ConfigurationFileNotFound { .. })
        ));
    }

    #[test]
    fn test_local_key_is_read_and_trimmed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ld.key");
        fs::write(&path, "  abc123\n").unwrap();

        let (factory, _, builder) = factory_with(&[("LaunchDarkly:SdkKey", "local")]);
        factory.create(Some(&path), None).unwrap();

        assert_eq!(builder.last_config().unwrap().sdk_key, "abc123");
    }

    #[test]
    fn test_local_key_from_configured_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ld.key");
        fs::write(&path, "from-settings\n").unwrap();
        let configured = path.to_string_lossy().to_string();

        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:SdkKey", "LOCAL"),
            ("LaunchDarkly:LocalKeyPath", configured.as_str()),
        ]);
        factory.create(None, None).unwrap();

        assert_eq!(builder.last_config().unwrap().sdk_key, "from-settings");
    }

    #[test]
    fn test_ampersand_escape_in_key() {
        let (factory, _, builder) = factory_with(&[("LaunchDarkly:SdkKey", "sdk&amp;1")]);
        factory.create(None, None).unwrap();
        assert_eq!(builder.last_config().unwrap().sdk_key, "sdk&1");
    }

    #[test]
    fn test_numeric_settings_are_clamped() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:SdkKey", "sdk-123"),
            ("LaunchDarkly:PollingIntervalSeconds", "1"),
            ("LaunchDarkly:ReportUsageInterval", "30"),
            ("LaunchDarkly:ReportUsageBufferSize", "10"),
        ]);
        factory.create(None, None).unwrap();

        let config = builder.last_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.events_flush_interval, Duration::from_secs(9));
        assert_eq!(config.events_capacity, 100);
    }

    #[test]
    fn test_malformed_numeric_settings_use_defaults() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:SdkKey", "sdk-123"),
            ("LaunchDarkly:PollingIntervalSeconds", "often"),
            ("LaunchDarkly:ReportUsageInterval", "2.5"),
        ]);
        factory.create(None, None).unwrap();

        let config = builder.last_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.events_flush_interval, Duration::from_secs(2));
        assert_eq!(config.events_capacity, 500);
    }

    #[test]
    fn test_logger_is_forwarded_and_used() {
        let (factory, _, builder) = factory_with(&[("LaunchDarkly:SdkKey", "sdk-0123456789")]);
        let logger = Arc::new(RecordingLogger::default());

        factory.create(None, Some(logger.clone())).unwrap();

        assert!(builder.last_config().unwrap().logger.is_some());
        let records = logger.0.lock();
        assert!(records.iter().any(|(_, m)| m.contains("Building feature flag provider")));
        assert!(records.iter().all(|(_, m)| !m.contains("0123456789")));
    }

    #[test]
    fn test_noop_logger_is_accepted() {
        let (factory, _, builder) = factory_with(&[("LaunchDarkly:SdkKey", "sdk-123")]);
        factory.create(None, Some(Arc::new(NoOpLogger::new()))).unwrap();
        assert!(builder.last_config().unwrap().logger.is_some());
    }

    #[test]
    fn test_failed_static_build_leaves_cache_empty() {
        let source = Arc::new(MemorySettingsSource::from_pairs([("LaunchDarkly:Strategy", "STATIC")]));
        let builder = Arc::new(MockClientBuilder::new());
        let factory = ProviderFactory::new(source.clone(), builder.clone());

        assert!(factory.create(None, None).is_err());
        assert!(!factory.cache().is_initialized());

        source.set("LaunchDarkly:SdkKey", "sdk-123");
        let provider = factory.create(None, None).unwrap();
        assert!(Arc::ptr_eq(&provider, &factory.cache().get().unwrap()));
    }

    #[test]
    fn test_builder_error_propagates() {
        let source = Arc::new(MemorySettingsSource::from_pairs([
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]));
        let factory = ProviderFactory::new(source, Arc::new(MockClientBuilder::failing("rejected")));

        assert!(matches!(factory.create(None, None), Err(FactoryError::Build(_))));
        assert!(!factory.cache().is_initialized());
    }

    #[test]
    fn test_shared_cache_between_factories() {
        let cache = Arc::new(ProviderCache::new());
        let source = Arc::new(MemorySettingsSource::from_pairs([
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]));
        let builder = Arc::new(MockClientBuilder::new());

        let a = ProviderFactory::with_cache(source.clone(), builder.clone(), cache.clone());
        let b = ProviderFactory::with_cache(source, builder.clone(), cache);

        assert!(Arc::ptr_eq(&a.create(None, None).unwrap(), &b.create(None, None).unwrap()));
        assert_eq!(builder.build_count(), 1);
    }

    #[test]
    fn test_concurrent_static_creates_build_once() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:Strategy", "STATIC"),
            ("LaunchDarkly:SdkKey", "sdk-123"),
        ]);
        let factory = Arc::new(factory);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || factory.create(None, None).unwrap())
            })
            .collect();
        let providers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builder.build_count(), 1);
        assert!(providers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_create_from_typed_settings() {
        let (factory, _, builder) = factory_with(&[]);
        let mut settings = LaunchDarklySettings::with_sdk_key("typed-key");
        settings.report_usage_interval = Some("0".to_string());

        factory.create_from_settings(&settings, None, None).unwrap();

        let config = builder.last_config().unwrap();
        assert_eq!(config.sdk_key, "typed-key");
        assert_eq!(config.events_flush_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_effective_config_does_not_build() {
        let (factory, _, builder) = factory_with(&[
            ("LaunchDarkly:SdkKey", "sdk-123"),
            ("LaunchDarkly:ReportUsageBufferSize", "250"),
        ]);

        let (config, source) = factory.effective_config(None).unwrap();
        assert_eq!(config.events_capacity, 250);
        assert_eq!(source, KeySource::Settings);
        assert_eq!(builder.build_count(), 0);
    }
}
