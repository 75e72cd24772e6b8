//! Error types for the edgequake-pdf2jpeg library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2JpegError`]: **Fatal**: the job for one stored document cannot
//!   proceed at all (download failed, empty object, not a PDF, wrong
//!   password). Returned as `Err(Pdf2JpegError)` from
//!   [`crate::job::JobDriver::convert_object`] and recorded in the
//!   per-record [`crate::output::RecordOutcome`].
//!
//! * [`PageError`]: **Non-fatal**: a single page failed to render, encode
//!   or upload. It is reported through
//!   [`crate::progress::ConversionProgressCallback::on_page_error`], logged,
//!   and stored in [`crate::output::ConversionSummary::failures`]. It never
//!   aborts sibling pages and never fails the job.

use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2jpeg library.
///
/// The leaf collaborators (document source, encoder, object store) also use
/// this type for their own failures; the page pipeline wraps those into a
/// [`PageError`] before reporting them.
#[derive(Debug, Error)]
pub enum Pdf2JpegError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Object-store download of the source document failed.
    #[error("Failed to download '{key}' from '{bucket}': {reason}")]
    DownloadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The object exists but holds zero bytes.
    #[error("Object '{key}' is empty (zero bytes downloaded)")]
    EmptyObject { key: String },

    /// The object was downloaded but is not a PDF.
    #[error("Object '{key}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { key: String, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// pdfium returned an error for a specific page (0-based `index`).
    #[error("Rasterisation failed for page index {index}: {detail}")]
    RasterisationFailed { index: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// A raster could not be serialised to the output image format.
    #[error("Image encoding failed: {detail}")]
    EncodeFailed { detail: String },

    /// Object-store upload failed.
    #[error("Failed to upload '{key}': {reason}")]
    UploadFailed { key: String, reason: String },

    // ── Trigger errors ────────────────────────────────────────────────────
    /// The trigger payload could not be parsed.
    #[error("Invalid trigger event: {0}")]
    InvalidEvent(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium on the system\n\
library path (for AWS Lambda, ship it in a layer under /opt/lib).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which stage of a page unit produced a [`PageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStage {
    Render,
    Encode,
    Upload,
    Panic,
}

/// A non-fatal error for a single page.
///
/// `page` is 1-based and `key` is the output key the page would have been
/// stored under, so a log line or collected error is enough to diagnose
/// which artefact is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Unable to extract image {key} (page {page}): {detail}")]
    RenderFailed {
        page: usize,
        key: String,
        detail: String,
    },

    /// Raster could not be encoded.
    #[error("Unable to encode image {key} (page {page}): {detail}")]
    EncodeFailed {
        page: usize,
        key: String,
        detail: String,
    },

    /// Encoded image could not be persisted.
    #[error("Unable to upload image {key} (page {page}): {detail}")]
    UploadFailed {
        page: usize,
        key: String,
        detail: String,
    },

    /// The page unit panicked before finishing.
    #[error("Page unit for {key} (page {page}) panicked: {detail}")]
    Panicked {
        page: usize,
        key: String,
        detail: String,
    },
}

impl PageError {
    /// 1-based page number of the failed page.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::EncodeFailed { page, .. }
            | PageError::UploadFailed { page, .. }
            | PageError::Panicked { page, .. } => *page,
        }
    }

    /// Output key the page would have been stored under.
    pub fn key(&self) -> &str {
        match self {
            PageError::RenderFailed { key, .. }
            | PageError::EncodeFailed { key, .. }
            | PageError::UploadFailed { key, .. }
            | PageError::Panicked { key, .. } => key,
        }
    }

    pub fn stage(&self) -> PageStage {
        match self {
            PageError::RenderFailed { .. } => PageStage::Render,
            PageError::EncodeFailed { .. } => PageStage::Encode,
            PageError::UploadFailed { .. } => PageStage::Upload,
            PageError::Panicked { .. } => PageStage::Panic,
        }
    }
}
