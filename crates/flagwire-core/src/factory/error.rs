//! Factory error types

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort provider construction
///
/// No partial handle is ever returned and the shared cache is left untouched
/// when any of these is raised.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// A mandatory setting is absent or blank
    #[error("The key '{key}' is not found in the config file.")]
    MissingConfigurationKey { key: String },

    /// A required argument could not be resolved from the call or from settings
    #[error("Missing argument `{argument}`: {message}")]
    MissingArgument { argument: String, message: String },

    /// The local SDK key file does not exist
    #[error("To run locally you need to have a file '{}' that contains your LaunchDarkly SDK key.", path.display())]
    ConfigurationFileNotFound { path: PathBuf },

    /// The local SDK key file exists but could not be read
    #[error("Failed to read SDK key file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings source itself failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client builder rejected the configuration
    #[error("Failed to build feature flag client: {0}")]
    Build(String),
}

impl FactoryError {
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingConfigurationKey { key: key.into() }
    }

    pub fn missing_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MissingArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigurationFileNotFound { path: path.into() }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }
}

pub type FactoryResult<T> = Result<T, FactoryError>;
