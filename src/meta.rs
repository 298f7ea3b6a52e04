//! File properties for the details pane.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Error;
use crate::media;

/// Stat-derived properties of one file, as shown in the properties dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProperties {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub size_formatted: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub is_directory: bool,
    pub extension: Option<String>,
}

/// Stat `path` and shape the result for display.
///
/// Creation time is not available on every filesystem; it degrades to `None`
/// rather than failing the lookup.
pub async fn properties(path: &Path) -> Result<FileProperties, Error> {
    let metadata = tokio::fs::metadata(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let extension = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(media::dotted_suffix);
    Ok(FileProperties {
        name,
        path: path.to_path_buf(),
        size: metadata.len(),
        size_formatted: format_bytes(metadata.len()),
        created: metadata.created().ok().map(DateTime::<Utc>::from),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        is_directory: metadata.is_dir(),
        extension,
    })
}

/// Human-readable size, 1024-based, at most two decimals with trailing zeros
/// trimmed ("1.5 KB", "1 MB", "0 Bytes").
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).log2() / 10.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let mut rendered = format!("{value:.2}");
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }
    format!("{rendered} {}", UNITS[exponent])
}
