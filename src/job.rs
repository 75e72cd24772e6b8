//! Job driver: turns one trigger event into conversions.
//!
//! Records are handled one after another; concurrency exists only inside a
//! single document's page fan-out. For each record the driver downloads the
//! object, validates it, opens it, derives the stem and hands the document to
//! a [`PageConverter`]. A job-level failure for one record is logged and
//! recorded in the [`JobOutcome`]; it does not stop later records.

use crate::config::ConversionConfig;
use crate::convert::PageConverter;
use crate::error::Pdf2JpegError;
use crate::event::S3Event;
use crate::output::{ConversionSummary, JobOutcome, RecordOutcome, RecordStatus};
use crate::pipeline::document::DocumentSource;
use crate::pipeline::encode::{ImageEncoder, JpegEncoder};
use crate::pipeline::naming::{derive_stem, is_source_key};
use crate::store::StoreProvider;
use std::sync::Arc;
use tracing::{error, info};

/// How far into the file the `%PDF` header may start.
const PDF_HEADER_WINDOW: usize = 1024;

/// Reject bytes that cannot be a PDF before handing them to the renderer.
pub fn validate_pdf_bytes(key: &str, bytes: &[u8]) -> Result<(), Pdf2JpegError> {
    if bytes.is_empty() {
        return Err(Pdf2JpegError::EmptyObject {
            key: key.to_string(),
        });
    }
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if !window.windows(4).any(|w| w == b"%PDF") {
        return Err(Pdf2JpegError::NotAPdf {
            key: key.to_string(),
            magic: bytes[..bytes.len().min(4)].to_vec(),
        });
    }
    Ok(())
}

/// Wires the document source, encoder and stores together.
///
/// Build once per process and reuse it for every event.
pub struct JobDriver {
    source: Arc<dyn DocumentSource>,
    encoder: Arc<dyn ImageEncoder>,
    stores: Arc<dyn StoreProvider>,
    config: ConversionConfig,
}

impl JobDriver {
    /// A driver encoding pages with [`JpegEncoder`].
    pub fn new(
        source: Arc<dyn DocumentSource>,
        stores: Arc<dyn StoreProvider>,
        config: ConversionConfig,
    ) -> Self {
        Self {
            source,
            encoder: Arc::new(JpegEncoder),
            stores,
            config,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Handle every record of `event`, in order.
    pub async fn handle_event(&self, event: &S3Event) -> JobOutcome {
        let mut outcome = JobOutcome::default();

        for record in &event.records {
            let bucket = record.bucket_name().to_string();

            let key = match record.decoded_key() {
                Ok(key) => key,
                Err(e) => {
                    error!("Skipping record in bucket {}: {}", bucket, e);
                    outcome.records.push(RecordOutcome {
                        bucket,
                        key: record.s3.object.key.clone(),
                        status: RecordStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            let status = if !record.is_object_created() {
                let reason = format!(
                    "event '{}' is not an object creation",
                    record.event_name.as_deref().unwrap_or_default()
                );
                info!("Skipping {}: {}", key, reason);
                RecordStatus::Skipped { reason }
            } else if !is_source_key(&key, &self.config.source_suffix) {
                let reason = format!("not a {} object", self.config.source_suffix);
                info!("Skipping {}: {}", key, reason);
                RecordStatus::Skipped { reason }
            } else {
                match self.convert_object(&bucket, &key).await {
                    Ok(summary) => RecordStatus::Converted(summary),
                    Err(e) => {
                        error!("Unable to convert pdf {} to images: {}", key, e);
                        RecordStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            outcome.records.push(RecordOutcome {
                bucket,
                key,
                status,
            });
        }

        info!(
            "Event handled: {} converted, {} skipped, {} failed, {} page failures",
            outcome.converted(),
            outcome.skipped(),
            outcome.failed(),
            outcome.failed_pages()
        );
        outcome
    }

    /// Download, validate, open and convert one object.
    ///
    /// # Errors
    /// Job-level failures only: download, empty object, not a PDF, open
    /// failure. Page failures are inside the returned summary.
    pub async fn convert_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<ConversionSummary, Pdf2JpegError> {
        info!("Starting conversion: {}/{}", bucket, key);
        let store = self.stores.store_for(bucket);

        let bytes = store.download(key).await?;
        validate_pdf_bytes(key, &bytes)?;

        let source = Arc::clone(&self.source);
        let password = self.config.password.clone();
        let document =
            tokio::task::spawn_blocking(move || source.open(bytes, password.as_deref()))
                .await
                .map_err(|e| Pdf2JpegError::Internal(format!("Open task panicked: {}", e)))??;

        let stem = derive_stem(key, &self.config.source_suffix);
        PageConverter::new(Arc::clone(&self.encoder), store, &self.config)
            .convert(document, stem)
            .await
    }
}
