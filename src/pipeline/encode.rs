//! Image encoding: `DynamicImage` → JPEG bytes.
//!
//! JPEG has no alpha channel and pdfium renders RGBA, so rasters are
//! flattened to RGB before encoding.

use crate::error::Pdf2JpegError;
use image::codecs::jpeg::JpegEncoder as JpegWriter;
use image::DynamicImage;
use tracing::debug;

/// Serialises a page raster into an encoded byte buffer.
pub trait ImageEncoder: Send + Sync {
    /// MIME type of the produced bytes, attached to uploads.
    fn content_type(&self) -> &'static str;

    /// Encode `raster`. `quality` is 1–100; encoders without a quality knob
    /// ignore it.
    fn encode(&self, raster: &DynamicImage, quality: u8) -> Result<Vec<u8>, Pdf2JpegError>;
}

/// Baseline JPEG encoder from the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn content_type(&self) -> &'static str {
        "image/jpeg"
    }

    fn encode(&self, raster: &DynamicImage, quality: u8) -> Result<Vec<u8>, Pdf2JpegError> {
        let rgb = raster.to_rgb8();
        let mut buf = Vec::new();
        JpegWriter::new_with_quality(&mut buf, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| Pdf2JpegError::EncodeFailed {
                detail: e.to_string(),
            })?;

        debug!(
            "Encoded {}x{} raster → {} bytes JPEG (q={})",
            rgb.width(),
            rgb.height(),
            buf.len(),
            quality
        );
        Ok(buf)
    }
}
