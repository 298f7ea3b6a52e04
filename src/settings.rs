//! JSON-file-backed settings store with defaults.
//!
//! Keys are the original camelCase settings names so an existing settings
//! file keeps working. Unknown keys found on disk are preserved verbatim;
//! defaults fill anything missing.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::Error;
use crate::media::MediaFormats;

/// Most-recently-used folder list length.
const MAX_RECENT_FOLDERS: usize = 10;

/// Scan cache entry cap used when the setting is absent or malformed.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 100;

/// The full default settings document.
#[must_use]
pub fn defaults() -> Map<String, Value> {
    let formats = serde_json::to_value(MediaFormats::stock())
        .unwrap_or_else(|_| json!({ "images": [], "videos": [] }));
    let Value::Object(map) = json!({
        "themeColor": "neon-blue",
        "autoPlayVideos": true,
        "showFileNames": true,
        "thumbnailSize": "medium",
        "viewerMode": "fit",
        "slideShowInterval": 3000,
        "defaultView": "grid",
        "sortBy": "name",
        "sortOrder": "asc",
        "filterBy": "all",
        "videoLoop": true,
        "favorites": [],
        "supportedFormats": formats,
        "recentFolders": [],
        "maxCacheSize": DEFAULT_MAX_CACHE_SIZE,
    }) else {
        unreachable!("defaults literal is an object");
    };
    map
}

/// Process-wide key-value settings, persisted across restarts.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Load settings from `path`, merging the on-disk document over the
    /// defaults. A missing file is simply the defaults.
    ///
    /// # Errors
    /// Unreadable file or invalid JSON.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut values = defaults();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let disk: Map<String, Value> = serde_json::from_str(&text)?;
                debug!(path = %path.display(), keys = disk.len(), "loaded settings");
                for (key, value) in disk {
                    values.insert(key, value);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn all(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Set one key and persist immediately.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    /// Restore every key to its default and persist.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.values = defaults();
        info!(path = %self.path.display(), "settings reset to defaults");
        self.persist()
    }

    /// Record `folder` at the front of the MRU list, deduplicated, capped.
    pub fn add_recent_folder(&mut self, folder: &Path) -> Result<(), Error> {
        let entry = Value::String(folder.to_string_lossy().into_owned());
        let mut recent = match self.values.get("recentFolders") {
            Some(Value::Array(list)) => list.clone(),
            _ => Vec::new(),
        };
        recent.retain(|v| *v != entry);
        recent.insert(0, entry);
        recent.truncate(MAX_RECENT_FOLDERS);
        self.values
            .insert("recentFolders".to_string(), Value::Array(recent));
        self.persist()
    }

    #[must_use]
    pub fn recent_folders(&self) -> Vec<String> {
        match self.values.get("recentFolders") {
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The configured image/video suffix lists.
    #[must_use]
    pub fn formats(&self) -> MediaFormats {
        self.values
            .get("supportedFormats")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_else(MediaFormats::stock)
    }

    #[must_use]
    pub fn max_cache_size(&self) -> usize {
        self.values
            .get("maxCacheSize")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_CACHE_SIZE, |n| n as usize)
    }

    fn persist(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
