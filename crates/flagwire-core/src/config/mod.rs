//! Settings sources and the typed LaunchDarkly settings read from them
//!
//! Sources:
//! - `MemorySettingsSource`: in-memory, for tests and embedding
//! - `EnvSettingsSource`: process environment (`Section__Key`)
//! - `FileSettingsSource`: YAML/JSON settings file, flattened to `Section:Key`
//! - `ChainSettingsSource`: ordered fallback over other sources

mod traits;
mod memory;
mod env;
mod file;
mod chain;
pub mod keys;
mod settings;

pub use traits::{SettingsSource, SharedSettingsSource, ConfigError, ConfigResult, read_setting};
pub use memory::MemorySettingsSource;
pub use env::EnvSettingsSource;
pub use file::FileSettingsSource;
pub use chain::ChainSettingsSource;
pub use settings::{
    LaunchDarklySettings, Strategy,
    effective_polling_interval, effective_report_usage_interval, effective_report_usage_buffer,
    DEFAULT_POLLING_INTERVAL_SECS, MIN_POLLING_INTERVAL_SECS,
    DEFAULT_REPORT_USAGE_INTERVAL_SECS, MIN_REPORT_USAGE_INTERVAL_SECS, MAX_REPORT_USAGE_INTERVAL_SECS,
    DEFAULT_REPORT_USAGE_BUFFER, MIN_REPORT_USAGE_BUFFER, LOCAL_SDK_KEY_SENTINEL,
};
