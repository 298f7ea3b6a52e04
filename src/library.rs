//! `MediaLibrary`: the command surface the GUI shell calls.
//!
//! Owns the settings store and every process-wide cache. Cache mutexes are
//! held only for map operations, never across await points; keys are
//! independent, so no cross-key coordination exists or is needed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::error::Error;
use crate::media::MediaFormats;
use crate::meta::{self, FileProperties};
use crate::ops::{self, BatchOutcome, FlipAxis};
use crate::scan::{ScanResult, Scanner};
use crate::settings::SettingsStore;
use crate::thumbs::{self, ThumbKey};
use crate::tree::{self, FolderNode};

/// Sweep cadence for all caches.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Scan entries older than this go in the periodic sweep even if never read.
const SCAN_MAX_AGE: Duration = Duration::from_secs(300);

const THUMB_CACHE_CAP: usize = 200;
const THUMB_SWEEP_BATCH: usize = 50;
const META_CACHE_CAP: usize = 500;
const META_SWEEP_BATCH: usize = 100;

/// Shared handle to the media library. Clones are cheap and refer to the same
/// caches and settings.
#[derive(Clone)]
pub struct MediaLibrary {
    inner: Arc<Inner>,
}

struct Inner {
    settings: Mutex<SettingsStore>,
    scanner: Scanner,
    thumbs: Mutex<TtlCache<ThumbKey, Arc<Vec<u8>>>>,
    meta: Mutex<TtlCache<PathBuf, FileProperties>>,
}

impl MediaLibrary {
    /// Open (or create) the settings store at `settings_path` and size the
    /// scan cache from it.
    ///
    /// # Errors
    /// Settings file exists but cannot be read or parsed.
    pub fn open(settings_path: &Path) -> Result<Self, Error> {
        let settings = SettingsStore::load(settings_path)?;
        let scanner = Scanner::new(settings.max_cache_size());
        Ok(Self {
            inner: Arc::new(Inner {
                settings: Mutex::new(settings),
                scanner,
                thumbs: Mutex::new(TtlCache::new(THUMB_CACHE_CAP, None)),
                meta: Mutex::new(TtlCache::new(META_CACHE_CAP, None)),
            }),
        })
    }

    /// Open a folder: record it as recent, then produce the gallery listing
    /// and the sidebar tree from two concurrent filesystem passes.
    ///
    /// The two passes may observe slightly different filesystems; within the
    /// scan TTL the gallery and the tree are each no staler than their own
    /// read. That skew is accepted rather than coupling the reads.
    pub async fn open_folder(&self, root: &Path) -> Result<(ScanResult, FolderNode), Error> {
        self.inner.settings_guard().add_recent_folder(root)?;
        let formats = self.formats();
        let extensions = formats.all_extensions();
        let (scanned, built) = tokio::join!(
            self.inner.scanner.scan(root, &extensions),
            tree::build(root, &formats),
        );
        Ok((scanned?, built?))
    }

    /// Gallery listing for `root` (cached, both media kinds).
    pub async fn scan_files(&self, root: &Path) -> Result<ScanResult, Error> {
        let extensions = self.formats().all_extensions();
        self.inner.scanner.scan(root, &extensions).await
    }

    /// Sidebar tree for `root`. Always rebuilt; never cached or patched.
    pub async fn folder_tree(&self, root: &Path) -> Result<FolderNode, Error> {
        let formats = self.formats();
        tree::build(root, &formats).await
    }

    pub async fn rename_file(&self, old: &Path, new: &Path) -> Result<(), Error> {
        ops::rename(old, new).await?;
        self.invalidate(old);
        Ok(())
    }

    pub async fn delete_file(&self, path: &Path) -> Result<(), Error> {
        ops::delete(path).await?;
        self.invalidate(path);
        Ok(())
    }

    /// Move `src` into `target_dir`; returns the new path.
    pub async fn move_file(&self, src: &Path, target_dir: &Path) -> Result<PathBuf, Error> {
        let target = ops::move_into(src, target_dir).await?;
        self.invalidate(src);
        Ok(target)
    }

    pub async fn batch_move(&self, files: &[PathBuf], target_dir: &Path) -> Vec<BatchOutcome> {
        let outcomes = ops::batch_move(files, target_dir).await;
        for outcome in &outcomes {
            if outcome.result.is_ok() {
                self.invalidate(&outcome.path);
            }
        }
        outcomes
    }

    pub async fn batch_delete(&self, files: &[PathBuf]) -> Vec<BatchOutcome> {
        let outcomes = ops::batch_delete(files).await;
        for outcome in &outcomes {
            if outcome.result.is_ok() {
                self.invalidate(&outcome.path);
            }
        }
        outcomes
    }

    /// Rotate in place by a quarter turn (degrees clockwise).
    pub async fn rotate_image(&self, path: &Path, angle: i32) -> Result<(), Error> {
        ops::rotate(path, angle).await?;
        self.invalidate(path);
        Ok(())
    }

    /// Mirror in place across `axis`.
    pub async fn flip_image(&self, path: &Path, axis: FlipAxis) -> Result<(), Error> {
        ops::flip(path, axis).await?;
        self.invalidate(path);
        Ok(())
    }

    /// JPEG thumbnail bytes for `path` at `size` (cached per path and size).
    pub async fn thumbnail(&self, path: &Path, size: u32) -> Result<Arc<Vec<u8>>, Error> {
        let key = ThumbKey {
            path: path.to_path_buf(),
            size,
        };
        if let Some(hit) = self.inner.thumbs_guard().get(&key, Instant::now()) {
            return Ok(hit.clone());
        }
        let bytes = tokio::fs::read(path).await?;
        let rendered =
            tokio::task::spawn_blocking(move || thumbs::render(&bytes, size)).await??;
        let rendered = Arc::new(rendered);
        self.inner
            .thumbs_guard()
            .insert(key, rendered.clone(), Instant::now());
        Ok(rendered)
    }

    /// Stat-derived properties for the details pane (cached per path).
    pub async fn file_properties(&self, path: &Path) -> Result<FileProperties, Error> {
        let key = path.to_path_buf();
        if let Some(hit) = self.inner.meta_guard().get(&key, Instant::now()) {
            return Ok(hit.clone());
        }
        let props = meta::properties(path).await?;
        self.inner
            .meta_guard()
            .insert(key, props.clone(), Instant::now());
        Ok(props)
    }

    /// Drop every cache entry made stale by a mutation of `path`: scan
    /// entries listing it, thumbnails rendered from it (any size), and its
    /// properties. Nothing is rebuilt until the next read misses.
    pub fn invalidate(&self, path: &Path) {
        let scan_entries = self.inner.scanner.invalidate(path);
        let thumb_entries = self
            .inner
            .thumbs_guard()
            .retain(|key, _| key.path != *path);
        self.inner.meta_guard().remove(&path.to_path_buf());
        debug!(
            path = %path.display(),
            scan_entries,
            thumb_entries,
            "invalidated cache entries"
        );
    }

    pub fn settings_get(&self, key: &str) -> Option<Value> {
        self.inner.settings_guard().get(key).cloned()
    }

    pub fn settings_all(&self) -> serde_json::Map<String, Value> {
        self.inner.settings_guard().all().clone()
    }

    pub fn settings_set(&self, key: &str, value: Value) -> Result<(), Error> {
        self.inner.settings_guard().set(key, value)
    }

    pub fn settings_reset(&self) -> Result<(), Error> {
        self.inner.settings_guard().reset()
    }

    #[must_use]
    pub fn recent_folders(&self) -> Vec<String> {
        self.inner.settings_guard().recent_folders()
    }

    /// Directory listings performed by the scanner so far.
    #[must_use]
    pub fn dir_reads(&self) -> u64 {
        self.inner.scanner.dir_reads()
    }

    /// Run one sweep pass now. The sweeper task calls this every minute; it
    /// is public so tests can trigger it with a synthetic clock.
    pub fn sweep(&self, now: Instant) {
        let scan_swept = self.inner.scanner.sweep_expired(now, SCAN_MAX_AGE);
        let mut thumb_swept = 0;
        {
            let mut thumbs = self.inner.thumbs_guard();
            if thumbs.len() > THUMB_CACHE_CAP {
                thumb_swept = thumbs.evict_oldest(THUMB_SWEEP_BATCH);
            }
        }
        let mut meta_swept = 0;
        {
            let mut metas = self.inner.meta_guard();
            if metas.len() > META_CACHE_CAP {
                meta_swept = metas.evict_oldest(META_SWEEP_BATCH);
            }
        }
        if scan_swept + thumb_swept + meta_swept > 0 {
            debug!(scan_swept, thumb_swept, meta_swept, "cache sweep");
        }
    }

    fn formats(&self) -> MediaFormats {
        self.inner.settings_guard().formats()
    }

    /// Spawn the periodic cache sweeper; it runs until `cancel` fires.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let library = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("cancel received; exiting sweeper task");
                        break;
                    }
                    _ = tick.tick() => {
                        library.sweep(Instant::now());
                    }
                }
            }
        })
    }
}

impl Inner {
    fn settings_guard(&self) -> MutexGuard<'_, SettingsStore> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn thumbs_guard(&self) -> MutexGuard<'_, TtlCache<ThumbKey, Arc<Vec<u8>>>> {
        self.thumbs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn meta_guard(&self) -> MutexGuard<'_, TtlCache<PathBuf, FileProperties>> {
        self.meta.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
