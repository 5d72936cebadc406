//! LaunchDarkly-backed provider (feature `launchdarkly`)
//!
//! Polling, event batching and flag evaluation all happen inside
//! `launchdarkly-server-sdk`; this module only maps [`ClientConfig`] onto the
//! SDK's builders and adapts the evaluation calls. The SDK applies its own
//! lower bound to the poll interval on top of ours.

use std::sync::Arc;

use hyper::client::HttpConnector;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use launchdarkly_server_sdk::{
    Client, ConfigBuilder, Context, ContextBuilder, EventProcessorBuilder, PollingDataSourceBuilder,
};

use super::traits::{ClientBuilder, ClientConfig, FeatureFlagProvider, SharedFlagProvider};
use crate::factory::{FactoryError, FactoryResult};
use crate::logging::{LoggerExt, SharedLogger};

type Connector = HttpsConnector<HttpConnector>;

fn https_connector() -> Connector {
    HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build()
}

/// Builds [`LaunchDarklyProvider`]s
///
/// Must be called from inside a tokio runtime: the SDK's background polling
/// and event delivery run on the current runtime. `build` returns as soon as
/// the client is started; evaluations return defaults until the first flag
/// payload arrives.
#[derive(Debug, Clone, Default)]
pub struct LaunchDarklyClientBuilder;

impl LaunchDarklyClientBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl ClientBuilder for LaunchDarklyClientBuilder {
    fn build(&self, config: ClientConfig) -> FactoryResult<SharedFlagProvider> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| FactoryError::build("LaunchDarkly client must be built inside a tokio runtime"))?;

        let mut data_source = PollingDataSourceBuilder::<Connector>::new();
        data_source
            .poll_interval(config.poll_interval)
            .https_connector(https_connector());

        let mut events = EventProcessorBuilder::<Connector>::new();
        events
            .capacity(config.events_capacity)
            .flush_interval(config.events_flush_interval)
            .https_connector(https_connector());

        let sdk_config = ConfigBuilder::new(&config.sdk_key)
            .data_source(&data_source)
            .event_processor(&events)
            .build()
            .map_err(|e| FactoryError::build(e.to_string()))?;

        let client = Client::build(sdk_config).map_err(|e| FactoryError::build(e.to_string()))?;

        let _enter = runtime.enter();
        client.start_with_default_executor();

        if let Some(logger) = &config.logger {
            logger.info_fmt(format_args!(
                "LaunchDarkly client started (initialized: {}, {config:?})",
                client.initialized()
            ));
        }

        Ok(Arc::new(LaunchDarklyProvider {
            client,
            logger: config.logger,
        }))
    }
}

/// Provider handle wrapping a started LaunchDarkly client
pub struct LaunchDarklyProvider {
    client: Client,
    logger: Option<SharedLogger>,
}

impl LaunchDarklyProvider {
    fn context(&self, context_key: &str) -> Option<Context> {
        match ContextBuilder::new(context_key).build() {
            Ok(context) => Some(context),
            Err(e) => {
                if let Some(logger) = &self.logger {
                    logger.warn_fmt(format_args!("invalid evaluation context '{context_key}': {e}"));
                }
                None
            }
        }
    }
}

impl FeatureFlagProvider for LaunchDarklyProvider {
    fn name(&self) -> &str {
        "launchdarkly"
    }

    fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    fn bool_variation(&self, flag_key: &str, context_key: &str, default: bool) -> bool {
        match self.context(context_key) {
            Some(ctx) => self.client.bool_variation(&ctx, flag_key, default),
            None => default,
        }
    }

    fn string_variation(&self, flag_key: &str, context_key: &str, default: &str) -> String {
        match self.context(context_key) {
            Some(ctx) => self.client.str_variation(&ctx, flag_key, default.to_string()),
            None => default.to_string(),
        }
    }

    fn int_variation(&self, flag_key: &str, context_key: &str, default: i64) -> i64 {
        match self.context(context_key) {
            Some(ctx) => self.client.int_variation(&ctx, flag_key, default),
            None => default,
        }
    }

    fn flush(&self) {
        self.client.flush();
    }

    fn close(&self) {
        self.client.close();
        if let Some(logger) = &self.logger {
            logger.info("LaunchDarkly client closed");
        }
    }
}
