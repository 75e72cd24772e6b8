//! Configuration types for PDF-to-JPEG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One config is constructed per process
//! and handed to the [`crate::job::JobDriver`]; nothing is read from global
//! state after that.

use crate::error::Pdf2JpegError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default number of pages converted concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Configuration for a PDF-to-JPEG conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf2jpeg::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .concurrency(4)
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 85);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Maximum number of page units in flight at once. Default: 4.
    ///
    /// Rasters are memory-heavy and every page opens an upload, so this caps
    /// both peak memory and outbound connections regardless of page count.
    pub concurrency: usize,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Passed to every [`crate::pipeline::document::PageDocument::render_page`]
    /// call. Caps either dimension, scaling the other proportionally, so an
    /// A0 poster cannot exhaust the function's memory.
    pub max_rendered_pixels: u32,

    /// Suffix identifying source documents; stripped to form the stem. Default: ".pdf".
    pub source_suffix: String,

    /// Extension of the output objects, without the dot. Default: "jpeg".
    pub output_extension: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives per-page progress and failure events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_rendered_pixels: 2000,
            source_suffix: ".pdf".to_string(),
            output_extension: "jpeg".to_string(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("concurrency", &self.concurrency)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("source_suffix", &self.source_suffix)
            .field("output_extension", &self.output_extension)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn source_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.source_suffix = suffix.into();
        self
    }

    pub fn output_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.output_extension = ext.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration. Numeric settings are already clamped by
    /// their setters; the suffix and extension are checked here.
    pub fn build(self) -> Result<ConversionConfig, Pdf2JpegError> {
        let c = &self.config;
        if c.source_suffix.is_empty() {
            return Err(Pdf2JpegError::InvalidConfig(
                "Source suffix must not be empty".into(),
            ));
        }
        if c.output_extension.is_empty() || c.output_extension.starts_with('.') {
            return Err(Pdf2JpegError::InvalidConfig(format!(
                "Output extension must be non-empty and without a leading dot, got '{}'",
                c.output_extension
            )));
        }
        Ok(self.config)
    }
}
