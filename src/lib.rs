//! Headless core for a local desktop media browser: directory scanning with
//! caching, folder-tree aggregation, cache invalidation, thumbnails, file
//! operations and persisted settings. The GUI shell is a consumer of
//! [`MediaLibrary`]; nothing here renders anything.

pub mod cache;
pub mod error;
pub mod library;
pub mod media;
pub mod meta;
pub mod ops;
pub mod scan;
pub mod settings;
pub mod thumbs;
pub mod tree;

pub use error::Error;
pub use library::MediaLibrary;
