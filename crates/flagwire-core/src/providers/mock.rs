//! Mock flag provider for testing
//!
//! Serves flags from an in-memory table without any network access. The
//! builder remembers every configuration it was asked to build, so tests can
//! assert on exactly what the factory handed to the vendor seam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::traits::{ClientBuilder, ClientConfig, FeatureFlagProvider, SharedFlagProvider};
use crate::factory::{FactoryError, FactoryResult};
use crate::logging::LoggerExt;

/// Value served by the mock for a flag
#[derive(Debug, Clone, PartialEq)]
pub enum MockFlagValue {
    Bool(bool),
    String(String),
    Int(i64),
}

impl From<bool> for MockFlagValue {
    fn from(value: bool) -> Self {
        MockFlagValue::Bool(value)
    }
}

impl From<&str> for MockFlagValue {
    fn from(value: &str) -> Self {
        MockFlagValue::String(value.to_string())
    }
}

impl From<i64> for MockFlagValue {
    fn from(value: i64) -> Self {
        MockFlagValue::Int(value)
    }
}

/// In-memory flag provider
///
/// Flags are the same for every context key. After [`close`](FeatureFlagProvider::close)
/// every evaluation returns the caller's default.
pub struct MockFlagProvider {
    config: ClientConfig,
    flags: RwLock<HashMap<String, MockFlagValue>>,
    closed: AtomicBool,
    flushes: AtomicUsize,
}

impl MockFlagProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_flags(config, HashMap::new())
    }

    pub fn with_flags(config: ClientConfig, flags: HashMap<String, MockFlagValue>) -> Self {
        Self {
            config,
            flags: RwLock::new(flags),
            closed: AtomicBool::new(false),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Configuration this provider was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_flag(&self, key: &str, value: impl Into<MockFlagValue>) {
        self.flags.write().insert(key.to_string(), value.into());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    fn lookup(&self, flag_key: &str) -> Option<MockFlagValue> {
        if self.is_closed() {
            return None;
        }
        self.flags.read().get(flag_key).cloned()
    }
}

impl FeatureFlagProvider for MockFlagProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_initialized(&self) -> bool {
        !self.is_closed()
    }

    fn bool_variation(&self, flag_key: &str, _context_key: &str, default: bool) -> bool {
        match self.lookup(flag_key) {
            Some(MockFlagValue::Bool(v)) => v,
            _ => default,
        }
    }

    fn string_variation(&self, flag_key: &str, _context_key: &str, default: &str) -> String {
        match self.lookup(flag_key) {
            Some(MockFlagValue::String(v)) => v,
            _ => default.to_string(),
        }
    }

    fn int_variation(&self, flag_key: &str, _context_key: &str, default: i64) -> i64 {
        match self.lookup(flag_key) {
            Some(MockFlagValue::Int(v)) => v,
            _ => default,
        }
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            if let Some(logger) = &self.config.logger {
                logger.debug("mock flag provider closed");
            }
        }
    }
}

impl std::fmt::Debug for MockFlagProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFlagProvider")
            .field("config", &self.config)
            .field("flags", &self.flags.read().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builder producing [`MockFlagProvider`]s
#[derive(Debug, Default)]
pub struct MockClientBuilder {
    flags: HashMap<String, MockFlagValue>,
    fail_with: Option<String>,
    built: Mutex<Vec<ClientConfig>>,
}

impl MockClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every built provider with this flag
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<MockFlagValue>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }

    /// Make every build fail with [`FactoryError::Build`]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of providers built so far
    pub fn build_count(&self) -> usize {
        self.built.lock().len()
    }

    pub fn last_config(&self) -> Option<ClientConfig> {
        self.built.lock().last().cloned()
    }
}

impl ClientBuilder for MockClientBuilder {
    fn build(&self, config: ClientConfig) -> FactoryResult<SharedFlagProvider> {
        if let Some(message) = &self.fail_with {
            return Err(FactoryError::build(message.clone()));
        }

        if let Some(logger) = &config.logger {
            logger.debug_fmt(format_args!("mock flag provider built: {config:?}"));
        }
        self.built.lock().push(config.clone());
        Ok(Arc::new(MockFlagProvider::with_flags(config, self.flags.clone())))
    }
}
