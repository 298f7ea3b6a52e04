//! Thumbnail rendering for the gallery grid.

use std::io::Cursor;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;

use crate::error::Error;

/// Edge length requested by the gallery when the caller does not say.
pub const DEFAULT_SIZE: u32 = 300;

const JPEG_QUALITY: u8 = 75;

/// Cache key for one rendered thumbnail: a thumbnail is per path *and* size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbKey {
    pub path: PathBuf,
    pub size: u32,
}

/// Decode `bytes`, cover-fit to a `size`×`size` square (scale to cover, crop
/// centered), and encode as JPEG.
///
/// CPU-bound; callers run this on the blocking pool.
///
/// # Errors
/// Any decode or encode failure propagates; nothing is written anywhere.
pub fn render(bytes: &[u8], size: u32) -> Result<Vec<u8>, Error> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    // Flatten to RGB; JPEG has no alpha channel.
    let square = decoded
        .resize_to_fill(size, size, FilterType::Triangle)
        .to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    square.write_with_encoder(encoder)?;
    Ok(out)
}
