//! SDK key resolution
//!
//! A configured key is used as-is unless it is the `LOCAL` sentinel, in which
//! case the real key is read from a file. This lets developers keep the key
//! out of checked-in settings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{keys, LOCAL_SDK_KEY_SENTINEL};
use super::error::{FactoryError, FactoryResult};

/// Where the SDK key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Taken directly from settings
    Settings,
    /// Read from this local file
    LocalFile(PathBuf),
}

/// Resolve the effective SDK key
///
/// `override_path` (from the caller) wins over `configured_path` (from
/// `LaunchDarkly:LocalKeyPath`). Both are only consulted for the sentinel.
pub fn resolve_sdk_key(
    raw: &str,
    override_path: Option<&Path>,
    configured_path: Option<&str>,
) -> FactoryResult<(String, KeySource)> {
    if !raw.eq_ignore_ascii_case(LOCAL_SDK_KEY_SENTINEL) {
        return Ok((raw.to_string(), KeySource::Settings));
    }

    let path = match (override_path, configured_path) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => {
            return Err(FactoryError::missing_argument(
                "local_key_path",
                format!(
                    "To run locally you need to provide a local key path, either by parameter or by value in config {}",
                    keys::LOCAL_KEY_PATH
                ),
            ))
        }
    };

    let key = read_local_key(&path)?;
    Ok((key, KeySource::LocalFile(path)))
}

/// Read a key file, trimming surrounding whitespace
///
/// Anything that is not a regular file (a directory, a dangling link) counts
/// as not found.
pub fn read_local_key(path: &Path) -> FactoryResult<String> {
    if !path.is_file() {
        return Err(FactoryError::file_not_found(path));
    }

    let content = fs::read_to_string(path).map_err(|source| FactoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.trim().to_string())
}
