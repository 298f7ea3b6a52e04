//! Sidebar folder tree: per-folder media counts aggregated over the subtree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::Error;
use crate::media::{self, MediaFormats, MediaKind};
use crate::scan::list_dir;

const MAX_OPEN_DIRS: usize = 64;

/// One folder in the sidebar tree.
///
/// `image_count`/`video_count` cover files directly in this folder;
/// `total_image_count`/`total_video_count` add all descendants. A folder only
/// appears among its parent's `children` when its cumulative total is
/// non-zero. The root is the exception: it is always returned so the UI can
/// show an empty state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub name: String,
    pub path: PathBuf,
    pub children: Vec<FolderNode>,
    pub image_count: u64,
    pub video_count: u64,
    pub total_image_count: u64,
    pub total_video_count: u64,
}

impl FolderNode {
    fn empty(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path,
            children: Vec::new(),
            image_count: 0,
            video_count: 0,
            total_image_count: 0,
            total_video_count: 0,
        }
    }

    /// Cumulative media count for this subtree.
    #[must_use]
    pub fn total_media(&self) -> u64 {
        self.total_image_count + self.total_video_count
    }
}

/// Build the folder tree under `root`, mirroring the filesystem.
///
/// Subdirectories are visited in parallel; child order is completion order.
/// Pruning is post-order: every subtree is counted before a zero-total child
/// is dropped. Unreadable folders count as empty.
///
/// # Errors
/// Returns [`Error::BadDir`] if `root` is missing or not a directory.
pub async fn build(root: &Path, formats: &MediaFormats) -> Result<FolderNode, Error> {
    if !root.is_dir() {
        return Err(Error::BadDir(root.display().to_string()));
    }
    let formats = Arc::new(formats.clone());
    let sem = Arc::new(Semaphore::new(MAX_OPEN_DIRS));
    Ok(build_node(root.to_path_buf(), formats, sem).await)
}

fn build_node(
    dir: PathBuf,
    formats: Arc<MediaFormats>,
    sem: Arc<Semaphore>,
) -> BoxFuture<'static, FolderNode> {
    Box::pin(async move {
        let mut node = FolderNode::empty(dir.clone());

        let entries = {
            let _permit = sem.acquire().await.ok();
            match list_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(dir = %dir.display(), %err, "treating unreadable folder as empty");
                    return node;
                }
            }
        };

        let mut subtrees = JoinSet::new();
        for entry in entries {
            if entry.is_dir {
                subtrees.spawn(build_node(entry.path, formats.clone(), sem.clone()));
            } else if let Some(name) = entry.path.file_name().and_then(|n| n.to_str()) {
                match media::classify(name, &formats) {
                    MediaKind::Image => node.image_count += 1,
                    MediaKind::Video => node.video_count += 1,
                    MediaKind::Other => {}
                }
            }
        }

        node.total_image_count = node.image_count;
        node.total_video_count = node.video_count;

        while let Some(joined) = subtrees.join_next().await {
            match joined {
                Ok(child) => {
                    // A dropped child has zero totals, so it contributes
                    // nothing either way.
                    if child.total_media() > 0 {
                        node.total_image_count += child.total_image_count;
                        node.total_video_count += child.total_video_count;
                        node.children.push(child);
                    }
                }
                Err(err) => warn!(%err, "folder subtree task failed"),
            }
        }

        node
    })
}
