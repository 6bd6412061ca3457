//! JPEG re-encoding of fetched source images
//!
//! Decoding and encoding are CPU-bound, so the work runs on the blocking
//! thread pool rather than on an async worker.

use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;

/// Re-encodes arbitrary source images as JPEG at a fixed quality.
///
/// Pixel data is normalized to RGB first so sources with an alpha channel
/// (PNG, WebP) can be written as JPEG.
pub struct ImageTransformer {
    quality: u8,
}

impl ImageTransformer {
    /// Quality is clamped to the valid JPEG range of 1-100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    fn transform_sync(data: Vec<u8>, quality: u8) -> Result<Vec<u8>> {
        let img = image::load_from_memory(&data)
            .map_err(|e| Error::Transform(format!("failed to decode image: {}", e)))?;

        let rgb = img.to_rgb8();
        let mut output = Vec::new();
        JpegEncoder::new_with_quality(&mut output, quality)
            .encode_image(&rgb)
            .map_err(|e| Error::Transform(format!("failed to encode JPEG: {}", e)))?;

        Ok(output)
    }

    pub async fn transform(&self, data: &[u8]) -> Result<Vec<u8>> {
        let quality = self.quality;
        tokio::task::spawn_blocking({
            let data = data.to_vec();
            move || Self::transform_sync(data, quality)
        })
        .await
        .map_err(|e| Error::Internal(format!("Image transform task join error: {}", e)))?
    }
}
