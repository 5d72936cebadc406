//! File-based settings source (YAML or JSON)
//!
//! Nested maps are flattened into `Section:Key` paths, so both of these
//! define `LaunchDarkly:SdkKey`:
//!
//! ```yaml
//! LaunchDarkly:
//!   SdkKey: sdk-123
//! ```
//!
//! ```yaml
//! "LaunchDarkly:SdkKey": sdk-123
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_yaml::Value;

use super::traits::{SettingsSource, ConfigError, ConfigResult};

type FlatSettings = HashMap<String, String>;

/// Settings loaded from a YAML or JSON file
///
/// The file is read on first lookup and cached; call [`reload`](Self::reload)
/// to pick up changes. A missing file reads as empty.
///
/// # Example
///
/// ```no_run
/// use flagwire_core::config::FileSettingsSource;
///
/// // ~/.config/flagwire/appsettings.yaml
/// let user = FileSettingsSource::user();
///
/// let local = FileSettingsSource::new("appsettings.json");
/// ```
pub struct FileSettingsSource {
    path: PathBuf,
    cache: RwLock<Option<Arc<FlatSettings>>>,
}

impl FileSettingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// User-level settings file under the platform config directory
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("flagwire").join("appsettings.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Re-read the file, replacing the cached contents
    pub fn reload(&self) -> ConfigResult<usize> {
        let settings = Arc::new(self.load()?);
        let count = settings.len();
        *self.cache.write() = Some(settings);
        Ok(count)
    }

    /// All flattened keys currently defined (lowercased)
    pub fn keys(&self) -> ConfigResult<Vec<String>> {
        let mut keys: Vec<String> = self.settings()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn load(&self) -> ConfigResult<FlatSettings> {
        if !self.path.exists() {
            return Ok(FlatSettings::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let root = self.parse(&content)?;

        let mut flat = FlatSettings::new();
        flatten(None, &root, &mut flat);
        crate::debug_log!("Loaded {} settings from {}", flat.len(), self.path.display());
        Ok(flat)
    }

    fn parse(&self, content: &str) -> ConfigResult<Value> {
        let is_json = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str::<Value>(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: self.path.display().to_string(),
            message,
        })
    }

    fn settings(&self) -> ConfigResult<Arc<FlatSettings>> {
        if let Some(settings) = self.cache.read().as_ref() {
            return Ok(Arc::clone(settings));
        }

        let settings = Arc::new(self.load()?);
        *self.cache.write() = Some(Arc::clone(&settings));
        Ok(settings)
    }
}

/// Flatten a settings tree into lowercased `a:b:c` keys
///
/// Sequences get their index as the path segment; nulls are skipped.
fn flatten(prefix: Option<&str>, value: &Value, out: &mut FlatSettings) {
    let join = |segment: &str| match prefix {
        Some(p) => format!("{p}:{segment}"),
        None => segment.to_string(),
    };

    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(segment) = scalar_to_string(k) {
                    flatten(Some(&join(&segment)), v, out);
                }
            }
        }
        Value::Sequence(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(Some(&join(&i.to_string())), v, out);
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out),
        scalar => {
            if let (Some(key), Some(text)) = (prefix, scalar_to_string(scalar)) {
                out.insert(key.to_ascii_lowercase(), text);
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl SettingsSource for FileSettingsSource {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.settings()?.get(&key.to_ascii_lowercase()).cloned())
    }
}

impl std::fmt::Debug for FileSettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSettingsSource")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}
