//! Page images: rasterise PDFs via pdfium, decode image files directly.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to drive from async tasks. Rendering and image
//! decoding are also CPU-heavy, so both run on Tokio's blocking pool.
//!
//! ## Resolution
//!
//! Pages are rendered at `dpi / 72` scale (PDF user space is 72 units per
//! inch) and capped at `max_rendered_pixels` on the longest edge, so an
//! oversized page cannot exhaust memory.

use crate::config::PipelineConfig;
use crate::error::TranscriptError;
use async_trait::async_trait;
use image::{DynamicImage, ImageReader};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One page ready for OCR.
///
/// The image sits behind an `Arc` so the first page can double as the
/// preview without a copy; nothing in the pipeline mutates it.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub image: Arc<DynamicImage>,
}

impl PageImage {
    pub fn new(page_num: usize, image: DynamicImage) -> Self {
        Self {
            page_num,
            image: Arc::new(image),
        }
    }
}

/// Converts a PDF into page images, one per page, in document order.
///
/// Implementations must return an error (never an empty list) when the PDF
/// cannot be parsed.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, TranscriptError>;
}

/// [`Rasterizer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    max_pixels: u32,
    password: Option<String>,
    library: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
            library: config.pdfium_library.clone(),
        }
    }

    fn render_config(&self) -> PdfRenderConfig {
        PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32)
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, TranscriptError> {
        let path = pdf_path.to_path_buf();
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.rasterize_blocking(&path))
            .await
            .map_err(|e| TranscriptError::Internal(format!("Render task panicked: {}", e)))?
    }
}

impl PdfiumRasterizer {
    fn rasterize_blocking(&self, pdf_path: &Path) -> Result<Vec<PageImage>, TranscriptError> {
        let pdfium = bind_pdfium(self.library.as_deref())?;
        let password = self.password.as_deref();

        let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    TranscriptError::WrongPassword {
                        path: pdf_path.to_path_buf(),
                    }
                } else {
                    TranscriptError::PasswordRequired {
                        path: pdf_path.to_path_buf(),
                    }
                }
            } else {
                TranscriptError::CorruptPdf {
                    path: pdf_path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let render_config = self.render_config();
        let mut results = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                TranscriptError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            results.push(PageImage::new(idx + 1, image));
        }

        Ok(results)
    }
}

/// Bind to libpdfium: an explicit path, then `PDFIUM_LIB_PATH`, then the
/// working directory, then the system library path.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, TranscriptError> {
    let explicit = library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => Pdfium::bind_to_library(&path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| TranscriptError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Decode an image file into a single page.
///
/// The decoder is chosen from the file header, so a JPEG saved as `.png`
/// still decodes. The extension is only a fallback for unrecognised headers.
pub async fn load_image(path: &Path) -> Result<PageImage, TranscriptError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let decode_err = |detail: String| TranscriptError::ImageDecode {
            path: path.clone(),
            detail,
        };
        let image = ImageReader::open(&path)
            .map_err(|e| decode_err(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        debug!(
            "Decoded {} → {}x{} px",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(PageImage::new(1, image))
    })
    .await
    .map_err(|e| TranscriptError::Internal(format!("Decode task panicked: {}", e)))?
}
