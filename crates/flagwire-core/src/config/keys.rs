//! Setting keys read by the factory

pub const STRATEGY: &str = "LaunchDarkly:Strategy";
pub const SDK_KEY: &str = "LaunchDarkly:SdkKey";
pub const LOCAL_KEY_PATH: &str = "LaunchDarkly:LocalKeyPath";
pub const POLLING_INTERVAL_SECONDS: &str = "LaunchDarkly:PollingIntervalSeconds";
pub const REPORT_USAGE_INTERVAL: &str = "LaunchDarkly:ReportUsageInterval";
pub const REPORT_USAGE_BUFFER_SIZE: &str = "LaunchDarkly:ReportUsageBufferSize";

