//! # edgequake-pdf2jpeg
//!
//! Rasterise PDF documents stored in an object store into one JPEG per page,
//! written back to the same bucket.
//!
//! A trigger (an S3 event notification) names newly stored documents. For
//! each one the [`JobDriver`] downloads the bytes, opens them with pdfium and
//! hands the document to the [`PageConverter`], which renders, encodes and
//! uploads every page with a bounded number of pages in flight. A page that
//! fails is logged and reported; it never stops the other pages.
//!
//! ## Pipeline Overview
//!
//! ```text
//! S3 event
//!  │
//!  ├─ 1. Trigger   decode records (bucket, URL-encoded key)
//!  ├─ 2. Download  fetch the document bytes from the bucket
//!  ├─ 3. Open      validate %PDF header, load via pdfium
//!  ├─ 4. Fan-out   ≤ 4 page units at once (semaphore), each:
//!  │                 render (pdfium) → encode (JPEG) → upload
//!  └─ 5. Join      wait for every page unit, report the summary
//! ```
//!
//! Page `n` of `reports/q3.pdf` is stored as `reports/q3-n.jpeg`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2jpeg::{ConversionConfig, JobDriver, PdfiumSource, S3Event, S3Stores};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let source = PdfiumSource::bind()?;
//!     let stores = S3Stores::from_env(None).await;
//!     let driver = JobDriver::new(Arc::new(source), Arc::new(stores), config);
//!
//!     let event = S3Event::from_json(&std::fs::read_to_string("event.json")?)?;
//!     let outcome = driver.handle_event(&event).await;
//!     eprintln!("{} converted, {} failed", outcome.converted(), outcome.failed());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpeg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod event;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::PageConverter;
pub use error::{PageError, PageStage, Pdf2JpegError};
pub use event::{S3Event, S3EventRecord};
pub use job::{validate_pdf_bytes, JobDriver};
pub use output::{ConversionSummary, JobOutcome, RecordOutcome, RecordStatus};
pub use pipeline::document::{DocumentSource, PageDocument};
pub use pipeline::encode::{ImageEncoder, JpegEncoder};
pub use pipeline::naming::{derive_stem, output_key};
pub use pipeline::render::PdfiumSource;
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, PageFailureCollector, ProgressCallback,
};
pub use store::{LocalStores, ObjectStore, S3Stores, StoreProvider};
