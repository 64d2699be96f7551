//! Inline image normalization.
//!
//! Records carry their cover art inline as a base64 data URI. Incoming
//! images are re-encoded to JPEG to bound row size; anything that fails to
//! decode is kept as-is, since a broken thumbnail beats a rejected record.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use std::io::Cursor;
use tracing::{debug, warn};

const JPEG_QUALITY: u8 = 80;
/// Images already smaller than this are left untouched.
const RECOMPRESS_THRESHOLD_BYTES: usize = 64 * 1024;

pub struct ImageProcessor {
    max_dimension: u32,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        ImageProcessor { max_dimension: 800 }
    }
}

impl ImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        ImageProcessor { max_dimension }
    }

    /// Normalizes a `data:` URI to a bounded JPEG data URI. Non-data-URI
    /// values (plain URLs) and undecodable payloads pass through unchanged.
    pub fn normalize_data_uri(&self, value: &str) -> String {
        let payload = match value.strip_prefix("data:") {
            Some(rest) => rest,
            None => return value.to_string(),
        };
        let base64_part = match payload.split_once(";base64,") {
            Some((_mime, data)) => data,
            None => return value.to_string(),
        };

        let bytes = match BASE64.decode(base64_part.trim()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Keeping image as-is, base64 decode failed: {}", err);
                return value.to_string();
            }
        };

        if bytes.len() < RECOMPRESS_THRESHOLD_BYTES {
            return value.to_string();
        }
        if !matches!(infer::get(&bytes), Some(kind) if kind.mime_type().starts_with("image/")) {
            warn!("Keeping image as-is, payload is not a recognizable image");
            return value.to_string();
        }

        match self.recompress(&bytes) {
            Ok(jpeg) if jpeg.len() < bytes.len() => {
                debug!(
                    "Recompressed inline image from {} to {} bytes",
                    bytes.len(),
                    jpeg.len()
                );
                format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg))
            }
            Ok(_) => value.to_string(),
            Err(err) => {
                warn!("Keeping image as-is, recompression failed: {}", err);
                value.to_string()
            }
        }
    }

    fn recompress(&self, bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?;
        let img = if img.width() > self.max_dimension || img.height() > self.max_dimension {
            img.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            img
        };

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        img.to_rgb8().write_with_encoder(encoder)?;
        Ok(out)
    }
}
