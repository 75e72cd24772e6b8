//! Document seams: open raw bytes, report a page count, render a page.

use crate::error::Pdf2JpegError;
use image::DynamicImage;
use std::sync::Arc;

/// Opens downloaded document bytes.
pub trait DocumentSource: Send + Sync {
    /// Parse `bytes` into a document whose pages can be rendered.
    ///
    /// Fails with a job-level error (corrupt file, password problems); page
    /// failures are reported later by [`PageDocument::render_page`].
    fn open(
        &self,
        bytes: Vec<u8>,
        password: Option<&str>,
    ) -> Result<Arc<dyn PageDocument>, Pdf2JpegError>;
}

/// An opened document.
///
/// Shared by every page unit of one conversion; it is closed when the last
/// `Arc` is dropped, which happens after the pipeline's final join.
pub trait PageDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Rasterise page `index` (0-based) with neither edge longer than
    /// `max_rendered_pixels`. Blocking; called from the blocking pool.
    fn render_page(
        &self,
        index: usize,
        max_rendered_pixels: u32,
    ) -> Result<DynamicImage, Pdf2JpegError>;
}
