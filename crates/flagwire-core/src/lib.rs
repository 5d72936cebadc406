//! Flagwire Core
//!
//! Builds feature-flag provider handles from application settings.
//! The flag service itself (polling, event delivery, evaluation) lives in
//! the vendor SDK; this crate owns everything in front of it:
//!
//! - reading `LaunchDarkly:*` settings from pluggable sources
//! - resolving the SDK key, including the `LOCAL` key-file fallback
//! - clamping polling and usage-report tunables into safe ranges
//! - handing out either one shared handle (`STATIC`) or a fresh one per call
//!
//! ```rust,ignore
//! use flagwire_core::{ProviderFactory, EnvSettingsSource, LaunchDarklyClientBuilder};
//!
//! let factory = ProviderFactory::new(
//!     Arc::new(EnvSettingsSource::new()),
//!     Arc::new(LaunchDarklyClientBuilder::new()),
//! );
//! let flags = factory.create(None, Some(logger))?;
//! if flags.bool_variation("new-checkout", "user-42", false) { ... }
//! ```

pub mod logging;
pub mod config;
pub mod providers;
pub mod factory;

pub use logging::{Logger, LogLevel, SharedLogger, NoOpLogger, ConsoleLogger, FileLogger};

pub use config::{
    SettingsSource, SharedSettingsSource, ConfigError, ConfigResult,
    MemorySettingsSource, EnvSettingsSource, FileSettingsSource, ChainSettingsSource,
    LaunchDarklySettings, Strategy,
};

pub use providers::{
    ClientBuilder, ClientConfig, ConfigSummary, FeatureFlagProvider, SharedFlagProvider,
    MockClientBuilder, MockFlagProvider, MockFlagValue,
    create_client_builder, supported_backends,
};
#[cfg(feature = "launchdarkly")]
pub use providers::{LaunchDarklyClientBuilder, LaunchDarklyProvider};

pub use factory::{
    ProviderFactory, ProviderCache, FactoryError, FactoryResult, KeySource, build_client_config,
};
