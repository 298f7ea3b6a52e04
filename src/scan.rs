//! Recursive media scanning with per-subdirectory fan-out and a TTL cache.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::error::Error;
use crate::media;

/// How long a cached scan stays fresh.
pub const SCAN_TTL: Duration = Duration::from_secs(60);

/// Upper bound on concurrently open directory listings per walk, so a
/// pathological tree cannot exhaust file handles.
const MAX_OPEN_DIRS: usize = 64;

/// One completed scan: every matching file under `root`, recursively.
///
/// `files` is in subtree-completion order, not lexical order; consumers that
/// need a deterministic order sort explicitly. Results are immutable and
/// superseded wholesale on re-scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    pub files: Arc<Vec<PathBuf>>,
}

/// Directory scanner with a process-wide scan cache keyed by root path.
#[derive(Debug)]
pub struct Scanner {
    cache: Mutex<TtlCache<String, ScanResult>>,
    dir_reads: Arc<AtomicU64>,
}

impl Scanner {
    #[must_use]
    pub fn new(max_cache_entries: usize) -> Self {
        Self {
            cache: Mutex::new(TtlCache::new(max_cache_entries, Some(SCAN_TTL))),
            dir_reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of directory listings performed so far. Useful for logging and
    /// for asserting that cache hits skip the filesystem.
    #[must_use]
    pub fn dir_reads(&self) -> u64 {
        self.dir_reads.load(Ordering::Relaxed)
    }

    /// Scan `root` for files whose dotted lowercase suffix is in `extensions`,
    /// serving from the cache when a fresh entry exists.
    ///
    /// # Errors
    /// Returns [`Error::BadDir`] if `root` is missing or not a directory.
    /// Unreadable subdirectories below the root never fail the scan; they
    /// contribute nothing and are logged.
    pub async fn scan(&self, root: &Path, extensions: &[String]) -> Result<ScanResult, Error> {
        if !root.is_dir() {
            return Err(Error::BadDir(root.display().to_string()));
        }
        let key = cache_key(root);
        if let Some(hit) = self.cache_guard().get(&key, Instant::now()) {
            debug!(root = %root.display(), files = hit.files.len(), "scan cache hit");
            return Ok(hit.clone());
        }

        let started = Instant::now();
        let files = self.walk(root, extensions).await;
        debug!(
            root = %root.display(),
            files = files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );

        let result = ScanResult {
            root: root.to_path_buf(),
            files: Arc::new(files),
        };
        self.cache_guard()
            .insert(key, result.clone(), Instant::now());
        Ok(result)
    }

    /// Uncached recursive walk.
    pub async fn walk(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let exts: Arc<HashSet<String>> = Arc::new(extensions.iter().cloned().collect());
        let sem = Arc::new(Semaphore::new(MAX_OPEN_DIRS));
        walk_dir(root.to_path_buf(), exts, sem, self.dir_reads.clone()).await
    }

    /// Drop every cache entry whose file list contains `path`. Returns the
    /// number of entries removed. Small caches make the linear member scan
    /// cheaper than maintaining a reverse index.
    pub fn invalidate(&self, path: &Path) -> usize {
        self.cache_guard()
            .retain(|_, result| !result.files.iter().any(|f| f == path))
    }

    /// Safety-net sweep for keys that are never re-queried.
    pub fn sweep_expired(&self, now: Instant, max_age: Duration) -> usize {
        self.cache_guard().sweep_expired(now, max_age)
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache_guard().len()
    }

    // A poisoned lock only means a panicking writer mid-update; cached scan
    // data is disposable, so recover the guard rather than propagate.
    fn cache_guard(&self) -> MutexGuard<'_, TtlCache<String, ScanResult>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache key for a scan root. The path string itself is the key; two spellings
/// of the same directory are simply two entries that each expire on their own.
#[must_use]
pub fn cache_key(root: &Path) -> String {
    root.to_string_lossy().into_owned()
}

fn walk_dir(
    dir: PathBuf,
    exts: Arc<HashSet<String>>,
    sem: Arc<Semaphore>,
    reads: Arc<AtomicU64>,
) -> BoxFuture<'static, Vec<PathBuf>> {
    Box::pin(async move {
        // Hold a permit only while this directory is being listed; children
        // acquire their own, so a deep tree cannot deadlock the pool.
        let entries = {
            // acquire only fails if the semaphore is closed, which never happens
            let _permit = sem.acquire().await.ok();
            reads.fetch_add(1, Ordering::Relaxed);
            match list_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(dir = %dir.display(), %err, "skipping unreadable directory");
                    return Vec::new();
                }
            }
        };

        let mut files = Vec::new();
        let mut subtrees = JoinSet::new();
        for entry in entries {
            if entry.is_dir {
                subtrees.spawn(walk_dir(
                    entry.path,
                    exts.clone(),
                    sem.clone(),
                    reads.clone(),
                ));
            } else if matches_extension(&entry.path, &exts) {
                files.push(entry.path);
            }
        }

        // Merge subtree results as they settle; completion order is the only
        // order these results have.
        while let Some(joined) = subtrees.join_next().await {
            match joined {
                Ok(mut sub) => files.append(&mut sub),
                Err(err) => warn!(%err, "subtree scan task failed"),
            }
        }
        files
    })
}

pub(crate) struct DirEntryInfo {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// List one directory level with entry types. Entries that vanish between the
/// listing and the type lookup are skipped, not fatal.
pub(crate) async fn list_dir(dir: &Path) -> std::io::Result<Vec<DirEntryInfo>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut out = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        match entry.file_type().await {
            Ok(file_type) => out.push(DirEntryInfo {
                path: entry.path(),
                is_dir: file_type.is_dir(),
            }),
            Err(err) => {
                debug!(path = %entry.path().display(), %err, "entry vanished during listing");
            }
        }
    }
    Ok(out)
}

fn matches_extension(path: &Path, exts: &HashSet<String>) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(media::dotted_suffix)
        .is_some_and(|suffix| exts.contains(&suffix))
}
