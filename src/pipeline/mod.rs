//! Pipeline stages for PDF-to-JPEG conversion.
//!
//! Each submodule implements exactly one collaborator of the page pipeline
//! in [`crate::convert`], behind a trait so tests can substitute in-memory
//! doubles.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ document ──▶ render ──▶ encode ──▶ store
//!           (open)       (pdfium)   (JPEG)     (upload)
//! ```
//!
//! 1. [`document`]: the `DocumentSource` / `PageDocument` seams
//! 2. [`render`]: pdfium-backed implementation; rendering is CPU-bound and
//!    runs on the blocking pool
//! 3. [`encode`]: `ImageEncoder` seam and the JPEG implementation
//! 4. [`naming`]: stem and per-page output key derivation

pub mod document;
pub mod encode;
pub mod naming;
pub mod render;
