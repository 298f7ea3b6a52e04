//! Media kind classification by file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What a file name looks like to the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

/// Image/video suffix lists, dotted and lowercase (e.g. `".jpg"`).
///
/// These come from the settings store at every call site; the classifier
/// itself carries no fallback list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormats {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl MediaFormats {
    /// The stock format lists shipped as settings defaults.
    #[must_use]
    pub fn stock() -> Self {
        Self {
            images: [
                ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg", ".ico", ".tiff",
                ".tif",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            videos: [".mp4", ".webm", ".ogg", ".mov", ".avi", ".mkv", ".flv", ".wmv"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Image and video suffixes merged, for scans that want both.
    #[must_use]
    pub fn all_extensions(&self) -> Vec<String> {
        self.images.iter().chain(&self.videos).cloned().collect()
    }
}

impl Default for MediaFormats {
    fn default() -> Self {
        Self::stock()
    }
}

/// Classify `file_name` by its final dotted suffix, case-insensitively.
///
/// No MIME sniffing; a name without a recognized suffix is [`MediaKind::Other`].
#[must_use]
pub fn classify(file_name: &str, formats: &MediaFormats) -> MediaKind {
    let Some(suffix) = dotted_suffix(file_name) else {
        return MediaKind::Other;
    };
    if formats.images.iter().any(|e| *e == suffix) {
        MediaKind::Image
    } else if formats.videos.iter().any(|e| *e == suffix) {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}

/// The final dotted suffix of a file name, lowercased (`"photo.JPG"` → `".jpg"`).
#[must_use]
pub fn dotted_suffix(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}
