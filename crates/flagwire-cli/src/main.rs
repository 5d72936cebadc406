//! flagwire command-line front end
//!
//! Composition root for the factory: settings come from the environment
//! layered over a YAML/JSON settings file, and the provider cache is owned
//! here for the lifetime of the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use flagwire_core::{
    create_client_builder, supported_backends, ChainSettingsSource, ConsoleLogger, EnvSettingsSource,
    FileSettingsSource, KeySource, LaunchDarklySettings, LogLevel, ProviderCache, ProviderFactory,
    SharedLogger, SharedSettingsSource,
};

#[derive(Debug, Parser)]
#[command(name = "flagwire", version, about = "Inspect and build feature flag providers")]
struct Cli {
    /// Settings file (YAML or JSON); defaults to the user-level appsettings.yaml
    #[arg(long, global = true, env = "FLAGWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Only read environment variables with this prefix
    #[arg(long, global = true)]
    env_prefix: Option<String>,

    /// Print debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the effective settings a provider would be built with
    Settings {
        /// Local SDK key file, used when the configured key is LOCAL
        #[arg(long)]
        local_key_path: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a provider and report its state
    Check {
        #[arg(long)]
        local_key_path: Option<PathBuf>,

        /// Client backend (mock, launchdarkly)
        #[arg(long, default_value = "mock")]
        backend: String,

        /// Evaluate this boolean flag after building
        #[arg(long, requires = "context")]
        flag: Option<String>,

        /// Context key to evaluate the flag for
        #[arg(long)]
        context: Option<String>,
    },
}

fn settings_source(cli: &Cli) -> SharedSettingsSource {
    let env = match &cli.env_prefix {
        Some(prefix) => EnvSettingsSource::with_prefix(prefix.clone()),
        None => EnvSettingsSource::new(),
    };
    let file = match &cli.config {
        Some(path) => FileSettingsSource::new(path),
        None => FileSettingsSource::user(),
    };
    let sources: Vec<SharedSettingsSource> = vec![Arc::new(env), Arc::new(file)];
    Arc::new(ChainSettingsSource::new(sources))
}

fn logger(verbose: bool) -> SharedLogger {
    let level = if verbose { LogLevel::Debug } else { LogLevel::Info };
    Arc::new(ConsoleLogger::new().with_min_level(level))
}

fn show_settings(source: SharedSettingsSource, local_key_path: Option<PathBuf>, json: bool) -> Result<()> {
    let settings = LaunchDarklySettings::load(source.as_ref()).context("reading settings")?;
    let (config, key_source) =
        flagwire_core::build_client_config(&settings, local_key_path.as_deref(), None)?;
    let summary = config.summary();

    let key_origin = match &key_source {
        KeySource::Settings => "settings".to_string(),
        KeySource::LocalFile(path) => path.display().to_string(),
    };

    if json {
        let value = serde_json::json!({
            "strategy": settings.strategy().as_str(),
            "sdkKeySource": key_origin,
            "client": summary,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("strategy:              {}", settings.strategy());
        println!("sdk key:               {} (from {})", summary.sdk_key, key_origin);
        println!("poll interval:         {}s", summary.poll_interval_secs);
        println!("usage report interval: {}s", summary.events_flush_interval_secs);
        println!("usage report buffer:   {}", summary.events_capacity);
    }
    Ok(())
}

fn check(
    source: SharedSettingsSource,
    logger: SharedLogger,
    local_key_path: Option<PathBuf>,
    backend: &str,
    flag: Option<(String, String)>,
) -> Result<()> {
    let Some(builder) = create_client_builder(backend) else {
        bail!(
            "unknown backend '{}' (available: {})",
            backend,
            supported_backends().join(", ")
        );
    };

    let cache = Arc::new(ProviderCache::new());
    let factory = ProviderFactory::with_cache(source, builder, cache);
    let provider = factory.create(local_key_path.as_deref(), Some(logger))?;

    println!("provider:    {}", provider.name());
    println!("initialized: {}", provider.is_initialized());
    if let Some((flag, context)) = flag {
        println!("{flag} for {context}: {}", provider.bool_variation(&flag, &context, false));
    }

    provider.flush();
    provider.close();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let source = settings_source(&cli);

    match cli.command {
        Command::Settings { local_key_path, json } => show_settings(source, local_key_path, json),
        Command::Check { local_key_path, backend, flag, context } => {
            let logger = logger(cli.verbose);
            let flag = flag.zip(context);
            // The SDK may block briefly while connecting; keep it off the async workers
            tokio::task::spawn_blocking(move || check(source, logger, local_key_path, &backend, flag))
                .await
                .context("provider check panicked")?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_parse_settings_command() {
        let cli = Cli::try_parse_from(["flagwire", "--config", "app.yaml", "settings", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("app.yaml")));
        assert!(matches!(cli.command, Command::Settings { json: true, .. }));
    }

    #[test]
    fn test_flag_requires_context() {
        assert!(Cli::try_parse_from(["flagwire", "check", "--flag", "f"]).is_err());
        assert!(Cli::try_parse_from(["flagwire", "check", "--flag", "f", "--context", "u"]).is_ok());
    }

    #[test]
    fn test_file_settings_feed_the_factory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("appsettings.yaml");
        fs::write(&path, "LaunchDarkly:\n  SdkKey: sdk-from-file\n  ReportUsageInterval: 42\n").unwrap();

        let cli = Cli::try_parse_from([
            "flagwire",
            "--config",
            path.to_str().unwrap(),
            "--env-prefix",
            "FLAGWIRE_CLI_TEST_UNSET_",
            "settings",
        ])
        .unwrap();
        let source = settings_source(&cli);
        let settings = LaunchDarklySettings::load(source.as_ref()).unwrap();

        assert_eq!(settings.sdk_key.as_deref(), Some("sdk-from-file"));
        assert_eq!(settings.report_usage_interval(), Duration::from_secs(9));
        assert!(show_settings(source, None, true).is_ok());
    }

    #[test]
    fn test_check_with_mock_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("appsettings.yaml");
        fs::write(&path, "LaunchDarkly:\n  SdkKey: sdk-from-file\n").unwrap();

        let source: SharedSettingsSource = Arc::new(FileSettingsSource::new(&path));
        let result = check(source, logger(false), None, "mock", Some(("f".into(), "u".into())));
        assert!(result.is_ok());
    }

    #[test]
    fn test_check_unknown_backend() {
        let source: SharedSettingsSource = Arc::new(FileSettingsSource::new("/nonexistent.yaml"));
        let err = check(source, logger(false), None, "carrier-pigeon", None).unwrap_err();
        assert!(err.to_string().contains("unknown backend"));
    }
}
