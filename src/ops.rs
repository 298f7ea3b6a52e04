//! File operations behind the gallery context menu.
//!
//! All operations are user-triggered one-shots: a failure is surfaced once
//! and never retried. Image edits decode and re-encode on the blocking pool
//! and leave the original untouched when the transform fails.

use std::path::{Path, PathBuf};

use image::ImageReader;
use tokio::fs;
use tracing::{debug, info};

use crate::error::Error;

/// Mirror axis for [`flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Per-file outcome of a batch operation.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<(), Error>,
}

/// Rename (or move, when the parent differs) `old` to `new`.
pub async fn rename(old: &Path, new: &Path) -> Result<(), Error> {
    fs::rename(old, new).await?;
    info!(from = %old.display(), to = %new.display(), "renamed");
    Ok(())
}

/// Delete one file.
pub async fn delete(path: &Path) -> Result<(), Error> {
    fs::remove_file(path).await?;
    info!(path = %path.display(), "deleted");
    Ok(())
}

/// Move `src` into `target_dir`, keeping its file name. Returns the new path.
pub async fn move_into(src: &Path, target_dir: &Path) -> Result<PathBuf, Error> {
    let Some(file_name) = src.file_name() else {
        return Err(Error::BadDir(src.display().to_string()));
    };
    let target = target_dir.join(file_name);
    fs::rename(src, &target).await?;
    info!(from = %src.display(), to = %target.display(), "moved");
    Ok(target)
}

/// Move each of `files` into `target_dir`. One failure never aborts the rest.
pub async fn batch_move(files: &[PathBuf], target_dir: &Path) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let result = move_into(file, target_dir).await.map(|_| ());
        outcomes.push(BatchOutcome {
            path: file.clone(),
            result,
        });
    }
    outcomes
}

/// Delete each of `files`, reporting per-file outcomes.
pub async fn batch_delete(files: &[PathBuf]) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        outcomes.push(BatchOutcome {
            path: file.clone(),
            result: delete(file).await,
        });
    }
    outcomes
}

/// Rotate the image at `path` in place by a quarter turn.
///
/// `angle` is degrees clockwise; negative values and multiples beyond ±360
/// are normalized. A normalized angle of 0 is a no-op.
///
/// # Errors
/// [`Error::BadAngle`] for anything that is not a quarter turn; decode and
/// write errors propagate with the file unmodified (the transformed bytes are
/// only written after a successful decode+transform).
pub async fn rotate(path: &Path, angle: i32) -> Result<(), Error> {
    let quarter = match angle.rem_euclid(360) {
        0 => {
            debug!(path = %path.display(), "rotate by 0 is a no-op");
            return Ok(());
        }
        q @ (90 | 180 | 270) => q,
        _ => return Err(Error::BadAngle(angle)),
    };

    let path_buf = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let decoded = ImageReader::open(&path_buf)?
            .with_guessed_format()?
            .decode()?;
        let rotated = match quarter {
            90 => decoded.rotate90(),
            180 => decoded.rotate180(),
            _ => decoded.rotate270(),
        };
        rotated.save(&path_buf)?;
        Ok(())
    })
    .await??;
    info!(path = %path.display(), angle, "rotated");
    Ok(())
}

/// Mirror the image at `path` in place across the given axis.
pub async fn flip(path: &Path, axis: FlipAxis) -> Result<(), Error> {
    let path_buf = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let decoded = ImageReader::open(&path_buf)?
            .with_guessed_format()?
            .decode()?;
        let flipped = match axis {
            FlipAxis::Horizontal => decoded.fliph(),
            FlipAxis::Vertical => decoded.flipv(),
        };
        flipped.save(&path_buf)?;
        Ok(())
    })
    .await??;
    info!(path = %path.display(), axis = ?axis, "flipped");
    Ok(())
}
