//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the page units run.
//!
//! Per-page failures never propagate out of
//! [`crate::convert::PageConverter::convert`]; besides the `warn!` log line,
//! this callback is the structured channel through which they surface.
//! [`PageFailureCollector`] gathers them into a list so tests and callers can
//! inspect them without scraping logs.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2jpeg::{ConversionConfig, PageFailureCollector, ProgressCallback};
//! use std::sync::Arc;
//!
//! let collector = Arc::new(PageFailureCollector::default());
//! let config = ConversionConfig::builder()
//!     .progress_callback(collector.clone() as ProgressCallback)
//!     .build()
//!     .unwrap();
//! // ... run a conversion, then:
//! assert!(collector.failures().is_empty());
//! ```

use crate::error::PageError;
use crate::output::ConversionSummary;
use std::sync::{Arc, Mutex};

/// Called by the page pipeline as it processes each page.
///
/// Page units run concurrently on the tokio runtime, so `on_page_start`,
/// `on_page_complete` and `on_page_error` may be called from different
/// threads at the same time and in any page order. All methods have no-op
/// defaults.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the page count is known, before any page unit is dispatched.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page unit has acquired its concurrency token.
    ///
    /// * `page_num`: 1-indexed page number
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been rendered, encoded and stored.
    ///
    /// * `key`  : output key the image was stored under
    /// * `bytes`: size of the encoded image
    fn on_page_complete(&self, page_num: usize, total_pages: usize, key: &str, bytes: usize) {
        let _ = (page_num, total_pages, key, bytes);
    }

    /// Called when a page unit ends with an error. The page produced no output.
    fn on_page_error(&self, error: &PageError, total_pages: usize) {
        let _ = (error, total_pages);
    }

    /// Called once after every dispatched page unit has finished.
    fn on_conversion_complete(&self, summary: &ConversionSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Collects every reported [`PageError`] in arrival order.
#[derive(Debug, Default)]
pub struct PageFailureCollector {
    failures: Mutex<Vec<PageError>>,
}

impl PageFailureCollector {
    /// Snapshot of the failures collected so far.
    pub fn failures(&self) -> Vec<PageError> {
        match self.failures.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drain the collected failures.
    pub fn take(&self) -> Vec<PageError> {
        match self.failures.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ConversionProgressCallback for PageFailureCollector {
    fn on_page_error(&self, error: &PageError, _total_pages: usize) {
        match self.failures.lock() {
            Ok(mut guard) => guard.push(error.clone()),
            Err(poisoned) => poisoned.into_inner().push(error.clone()),
        }
    }
}
