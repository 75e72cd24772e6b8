//! The page conversion pipeline: every page of one opened document becomes
//! one stored image.
//!
//! ## Bounded fan-out
//!
//! Each page runs as its own tokio task (a *page unit*): render and encode on
//! the blocking pool, then upload. Before a unit is spawned the dispatch loop
//! acquires a permit from a semaphore sized by
//! [`ConversionConfig::concurrency`], so at most that many pages are in
//! flight and the loop itself waits while the pool is exhausted. The permit
//! is moved into the unit and released when the unit ends, on every path.
//!
//! Units finish in any order; each page's output key is self-contained.
//!
//! ## Failure isolation
//!
//! A failed render, encode or upload ends that page's unit only. The failure
//! is logged, reported through
//! [`crate::progress::ConversionProgressCallback::on_page_error`] and listed
//! in the returned [`ConversionSummary`]; it is never returned as an error.
//! A panicking unit is caught and reported the same way.
//! [`PageConverter::convert`] returns only after every dispatched unit has
//! finished.

use crate::config::ConversionConfig;
use crate::error::{PageError, Pdf2JpegError};
use crate::output::ConversionSummary;
use crate::pipeline::document::PageDocument;
use crate::pipeline::encode::ImageEncoder;
use crate::pipeline::naming::output_key;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::store::ObjectStore;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Converts all pages of a document and stores them through one
/// [`ObjectStore`].
pub struct PageConverter {
    encoder: Arc<dyn ImageEncoder>,
    store: Arc<dyn ObjectStore>,
    progress: ProgressCallback,
    concurrency: usize,
    jpeg_quality: u8,
    max_rendered_pixels: u32,
    output_extension: String,
}

impl PageConverter {
    pub fn new(
        encoder: Arc<dyn ImageEncoder>,
        store: Arc<dyn ObjectStore>,
        config: &ConversionConfig,
    ) -> Self {
        let progress = config
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback));
        Self {
            encoder,
            store,
            progress,
            // Public field, so it may bypass the builder; zero would never
            // hand out a permit.
            concurrency: config.concurrency.max(1),
            jpeg_quality: config.jpeg_quality,
            max_rendered_pixels: config.max_rendered_pixels,
            output_extension: config.output_extension.clone(),
        }
    }

    /// Convert every page of `document`, storing page `n` under
    /// `"<prefix>-<n>.<ext>"`.
    ///
    /// # Returns
    /// `Ok(ConversionSummary)` once all page units have finished, whether or
    /// not individual pages failed (check `summary.failures`).
    ///
    /// # Errors
    /// Only if the concurrency limiter is closed, which does not happen while
    /// this call owns it.
    pub async fn convert(
        &self,
        document: Arc<dyn PageDocument>,
        prefix: &str,
    ) -> Result<ConversionSummary, Pdf2JpegError> {
        let start = Instant::now();
        let total_pages = document.page_count();
        info!(
            "Converting {} pages of '{}' (concurrency {})",
            total_pages, prefix, self.concurrency
        );
        self.progress.on_conversion_start(total_pages);

        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let mut units: JoinSet<Result<(usize, String), PageError>> = JoinSet::new();

        for index in 0..total_pages {
            let page_num = index + 1;
            let key = output_key(prefix, page_num, &self.output_extension);

            // Blocks dispatch while `concurrency` units are in flight.
            let permit = Arc::clone(&limiter)
                .acquire_owned()
                .await
                .map_err(|e| Pdf2JpegError::Internal(format!("Concurrency limiter closed: {}", e)))?;

            let unit = PageUnit {
                document: Arc::clone(&document),
                encoder: Arc::clone(&self.encoder),
                store: Arc::clone(&self.store),
                progress: Arc::clone(&self.progress),
                quality: self.jpeg_quality,
                max_rendered_pixels: self.max_rendered_pixels,
                index,
                total_pages,
                key: key.clone(),
            };
            let progress = Arc::clone(&self.progress);

            units.spawn(async move {
                let _permit = permit;
                match AssertUnwindSafe(unit.run()).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => {
                        let err = PageError::Panicked {
                            page: page_num,
                            key,
                            detail: panic_message(payload.as_ref()),
                        };
                        warn!("{}", err);
                        progress.on_page_error(&err, total_pages);
                        Err(err)
                    }
                }
            });
        }

        let mut uploaded = Vec::with_capacity(total_pages);
        let mut failures = Vec::new();
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(Ok(done)) => uploaded.push(done),
                Ok(Err(err)) => failures.push(err),
                // Units are never aborted and panics are caught inside them,
                // so this only happens when the runtime is shutting down.
                Err(e) => error!("Page unit join error: {}", e),
            }
        }

        uploaded.sort_by_key(|(page, _)| *page);
        failures.sort_by_key(PageError::page);

        let summary = ConversionSummary {
            prefix: prefix.to_string(),
            total_pages,
            uploaded: uploaded.into_iter().map(|(_, key)| key).collect(),
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if summary.failures.is_empty() {
            info!(
                "Converted {}/{} pages of '{}' in {}ms",
                summary.processed_pages(),
                total_pages,
                prefix,
                summary.duration_ms
            );
        } else {
            warn!(
                "Converted {}/{} pages of '{}' in {}ms ({} failed)",
                summary.processed_pages(),
                total_pages,
                prefix,
                summary.duration_ms,
                summary.failed_pages()
            );
        }
        self.progress.on_conversion_complete(&summary);

        Ok(summary)
    }
}

/// Everything one page needs; owned by its task.
struct PageUnit {
    document: Arc<dyn PageDocument>,
    encoder: Arc<dyn ImageEncoder>,
    store: Arc<dyn ObjectStore>,
    progress: ProgressCallback,
    quality: u8,
    max_rendered_pixels: u32,
    index: usize,
    total_pages: usize,
    key: String,
}

impl PageUnit {
    /// Render → encode → upload. Returns the page number and key on success.
    async fn run(self) -> Result<(usize, String), PageError> {
        let page_num = self.index + 1;
        self.progress.on_page_start(page_num, self.total_pages);

        let result = self.render_encode_upload(page_num).await;
        match &result {
            Ok(bytes) => {
                debug!("Stored {} ({} bytes)", self.key, bytes);
                self.progress
                    .on_page_complete(page_num, self.total_pages, &self.key, *bytes);
            }
            Err(err) => {
                warn!("{}", err);
                self.progress.on_page_error(err, self.total_pages);
            }
        }
        result.map(|_| (page_num, self.key))
    }

    async fn render_encode_upload(&self, page_num: usize) -> Result<usize, PageError> {
        let document = Arc::clone(&self.document);
        let encoder = Arc::clone(&self.encoder);
        let (index, quality, max_px) = (self.index, self.quality, self.max_rendered_pixels);
        let key = self.key.clone();

        // The raster lives only inside this closure.
        let encoded = tokio::task::spawn_blocking(move || {
            let raster = document
                .render_page(index, max_px)
                .map_err(|e| PageError::RenderFailed {
                    page: page_num,
                    key: key.clone(),
                    detail: e.to_string(),
                })?;
            encoder
                .encode(&raster, quality)
                .map_err(|e| PageError::EncodeFailed {
                    page: page_num,
                    key,
                    detail: e.to_string(),
                })
        })
        .await
        .map_err(|e| PageError::Panicked {
            page: page_num,
            key: self.key.clone(),
            detail: format!("Render task failed: {}", e),
        })??;

        let len = encoded.len();
        self.store
            .upload(&self.key, encoded, self.encoder.content_type())
            .await
            .map_err(|e| PageError::UploadFailed {
                page: page_num,
                key: self.key.clone(),
                detail: e.to_string(),
            })?;

        Ok(len)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
