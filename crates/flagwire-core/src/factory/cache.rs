//! Shared provider handle for the static strategy

use once_cell::sync::OnceCell;

use crate::providers::SharedFlagProvider;
use super::error::FactoryResult;

/// Lazily initialised, process-lifetime provider handle
///
/// Owned by the application's composition root and shared between factories
/// via `Arc`. Initialisation is an atomic check-and-set: concurrent first
/// callers block while one of them builds, and a failed build leaves the
/// cache empty for the next caller to retry.
#[derive(Default)]
pub struct ProviderCache {
    cell: OnceCell<SharedFlagProvider>,
}

impl ProviderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached handle, if one has been built
    pub fn get(&self) -> Option<SharedFlagProvider> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the cached handle, building it with `init` on first use
    ///
    /// `init` runs at most once successfully per cache.
    pub fn get_or_try_init<F>(&self, init: F) -> FactoryResult<SharedFlagProvider>
    where
        F: FnOnce() -> FactoryResult<SharedFlagProvider>,
    {
        self.cell.get_or_try_init(init).cloned()
    }
}

impl std::fmt::Debug for ProviderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCache")
            .field("provider", &self.cell.get().map(|p| p.name().to_string()))
            .finish()
    }
}
