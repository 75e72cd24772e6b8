//! PDF rasterisation via pdfium.
//!
//! ## Sharing one document across page units
//!
//! pdfium is not re-entrant. With the `thread_safe` feature every call into
//! the library is serialised, and the `sync` feature makes an opened
//! [`PdfDocument`] shareable. [`PdfiumDocument`] additionally guards the
//! document with a mutex so a page load and its render happen as one unit.
//! Rendering is therefore effectively sequential; the concurrency of the
//! pipeline pays off in encoding and uploading, which run in parallel.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 150 DPI would produce a
//! 12,000 × 17,000 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping the memory of each in-flight raster
//! bounded.

use crate::error::Pdf2JpegError;
use crate::pipeline::document::{DocumentSource, PageDocument};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// [`DocumentSource`] backed by a bound pdfium library.
///
/// Construct once per process and share it; each call to
/// [`PdfiumSource::bind`] binds and initialises the library again. Clones
/// share the bound library.
#[derive(Clone)]
pub struct PdfiumSource {
    pdfium: &'static Pdfium,
}

impl PdfiumSource {
    /// Bind to `PDFIUM_LIB_PATH` when set, otherwise to the system library.
    pub fn bind() -> Result<Self, Pdf2JpegError> {
        match std::env::var(PDFIUM_LIB_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::bind_from_path(Path::new(&path)),
            _ => {
                let bindings = Pdfium::bind_to_system_library()
                    .map_err(|e| Pdf2JpegError::PdfiumBindingFailed(e.to_string()))?;
                info!("Bound to system pdfium library");
                Ok(Self::from_pdfium(Pdfium::new(bindings)))
            }
        }
    }

    /// Bind to the pdfium library file at `path`.
    pub fn bind_from_path(path: &Path) -> Result<Self, Pdf2JpegError> {
        let bindings = Pdfium::bind_to_library(path).map_err(|e| {
            Pdf2JpegError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
        })?;
        info!("Bound to pdfium library at {}", path.display());
        Ok(Self::from_pdfium(Pdfium::new(bindings)))
    }

    fn from_pdfium(pdfium: Pdfium) -> Self {
        // Opened documents borrow the library, and the library stays bound
        // for the life of the process.
        let pdfium: &'static Pdfium = Box::leak(Box::new(pdfium));
        Self { pdfium }
    }
}

impl DocumentSource for PdfiumSource {
    fn open(
        &self,
        bytes: Vec<u8>,
        password: Option<&str>,
    ) -> Result<Arc<dyn PageDocument>, Pdf2JpegError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, password)
            .map_err(|e| classify_load_error(&format!("{:?}", e), password.is_some()))?;

        let page_count = document.pages().len() as usize;
        info!("PDF loaded: {} pages", page_count);

        Ok(Arc::new(PdfiumDocument {
            document: Mutex::new(document),
            page_count,
        }))
    }
}

/// Map a pdfium load failure onto the fatal error taxonomy.
fn classify_load_error(detail: &str, password_given: bool) -> Pdf2JpegError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            Pdf2JpegError::WrongPassword
        } else {
            Pdf2JpegError::PasswordRequired
        }
    } else {
        Pdf2JpegError::CorruptPdf {
            detail: detail.to_string(),
        }
    }
}

/// An opened pdfium document.
pub struct PdfiumDocument {
    document: Mutex<PdfDocument<'static>>,
    page_count: usize,
}

impl PageDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(
        &self,
        index: usize,
        max_rendered_pixels: u32,
    ) -> Result<DynamicImage, Pdf2JpegError> {
        let page_index =
            PdfPageIndex::try_from(index).map_err(|_| Pdf2JpegError::RasterisationFailed {
                index,
                detail: format!("page index exceeds {}", PdfPageIndex::MAX),
            })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_rendered_pixels as i32)
            .set_maximum_height(max_rendered_pixels as i32);

        let document = self
            .document
            .lock()
            .map_err(|_| Pdf2JpegError::Internal("pdfium document lock poisoned".into()))?;

        let page = document
            .pages()
            .get(page_index)
            .map_err(|e| Pdf2JpegError::RasterisationFailed {
                index,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2JpegError::RasterisationFailed {
                index,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
