use thiserror::Error;

/// Library error type for media browser operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested scan/tree root is missing or not a directory.
    #[error("invalid media directory: {0}")]
    BadDir(String),

    /// Rotation is only supported in quarter turns.
    #[error("unsupported rotation angle: {0}")]
    BadAngle(i32),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Decode/encode error from the image pipeline.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// JSON (de)serialization error from the settings store.
    #[error(transparent)]
    Settings(#[from] serde_json::Error),

    /// A blocking worker task panicked or was aborted.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
