//! Feature-flag provider handles and the builders that create them
//!
//! `ClientBuilder` is the seam to the vendor SDK. The factory validates and
//! clamps settings into a `ClientConfig`; a builder turns that into a live
//! `FeatureFlagProvider`.
//!
//! - `LaunchDarklyClientBuilder` (feature `launchdarkly`): the real client
//! - `MockClientBuilder`: in-memory flags for tests and offline development

mod traits;
mod mock;
#[cfg(feature = "launchdarkly")]
mod launchdarkly;

pub use traits::{ClientBuilder, ClientConfig, ConfigSummary, FeatureFlagProvider, SharedFlagProvider};
pub use mock::{MockClientBuilder, MockFlagProvider, MockFlagValue};
#[cfg(feature = "launchdarkly")]
pub use launchdarkly::{LaunchDarklyClientBuilder, LaunchDarklyProvider};

use std::sync::Arc;

/// Create a client builder by backend name
///
/// Returns `None` for unknown names and for `launchdarkly` when the crate was
/// built without that feature.
pub fn create_client_builder(backend: &str) -> Option<Arc<dyn ClientBuilder>> {
    match backend.to_ascii_lowercase().as_str() {
        "mock" => Some(Arc::new(MockClientBuilder::new())),
        #[cfg(feature = "launchdarkly")]
        "launchdarkly" => Some(Arc::new(LaunchDarklyClientBuilder::new())),
        _ => None,
    }
}

/// Backend names accepted by [`create_client_builder`] in this build
pub fn supported_backends() -> Vec<&'static str> {
    let mut backends = vec!["mock"];
    if cfg!(feature = "launchdarkly") {
        backends.push("launchdarkly");
    }
    backends
}
