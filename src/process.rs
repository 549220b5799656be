//! Pipeline entry points: document in, [`PipelineResult`] out.
//!
//! A run is strictly sequential: resolve the input, build page images,
//! OCR each page in order, join the texts with `\n`, extract, classify.
//! Nothing is cached between runs and nothing is retried; the first fatal
//! error is returned as-is.

use crate::config::PipelineConfig;
use crate::error::TranscriptError;
use crate::output::{PipelineResult, PipelineStats};
use crate::pipeline::input::{self, DocumentFormat, RawDocument};
use crate::pipeline::rasterize::{self, PageImage, PdfiumRasterizer, Rasterizer};
use crate::pipeline::{classify, extract, ocr};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process a transcript given as a local path or HTTP/HTTPS URL.
///
/// # Errors
/// Returns `Err(TranscriptError)` when the input is unusable, the PDF cannot
/// be rasterised, or the OCR engine fails. A transcript without a
/// recognisable GPA is **not** an error; it yields `GPA NOT FOUND`.
pub async fn process(
    input_str: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<PipelineResult, TranscriptError> {
    let input_str = input_str.as_ref();
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    // `resolved` keeps any downloaded temp file alive until we return.
    process_document(resolved.document(), config).await
}

/// Process an already-validated document.
pub async fn process_document(
    document: &RawDocument,
    config: &PipelineConfig,
) -> Result<PipelineResult, TranscriptError> {
    let total_start = Instant::now();
    info!(
        "Processing {} transcript: {}",
        document.format(),
        document.path().display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_start(&document.path().display().to_string());
    }

    let engine = ocr::resolve_engine(config)?;

    // ── Step 1: Page images ──────────────────────────────────────────────
    let raster_start = Instant::now();
    let pages = load_pages(document, config).await?;
    let rasterize_duration_ms = raster_start.elapsed().as_millis() as u64;
    let total_pages = pages.len();
    info!("{} page(s) ready in {}ms", total_pages, rasterize_duration_ms);
    if let Some(ref cb) = config.progress_callback {
        cb.on_pages_ready(total_pages);
    }

    // ── Step 2: OCR, in page order ───────────────────────────────────────
    let ocr_start = Instant::now();
    let mut texts = Vec::with_capacity(total_pages);
    for page in &pages {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page.page_num, total_pages);
        }
        let text = engine.recognize(&page.image).await.inspect_err(|e| {
            warn!("{} failed on page {}: {}", engine.name(), page.page_num, e);
        })?;
        debug!("Page {}: {} chars of OCR text", page.page_num, text.len());
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_recognized(page.page_num, total_pages, text.len());
        }
        texts.push(text);
    }
    let ocr_text = texts.join("\n");
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    // Only the preview outlives the run.
    let preview = Arc::clone(&pages[0].image);
    drop(pages);

    // ── Step 3: Extract + classify ───────────────────────────────────────
    let extraction = extract::extract(&ocr_text);
    let (eligibility, summary) = classify::evaluate(extraction.gpa, config.threshold);

    let stats = PipelineStats {
        page_count: total_pages,
        rasterize_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Verdict: {} (name={:?}, gpa={:?}, threshold={:.2}) in {}ms",
        eligibility, extraction.name, extraction.gpa, config.threshold, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(eligibility);
    }

    Ok(PipelineResult {
        name: extraction.name,
        gpa: extraction.gpa,
        eligibility,
        summary,
        ocr_text,
        preview,
        stats,
    })
}

/// Process transcript bytes held in memory.
///
/// The bytes are written to a managed temp file that is removed on return.
pub async fn process_bytes(
    bytes: &[u8],
    format: DocumentFormat,
    config: &PipelineConfig,
) -> Result<PipelineResult, TranscriptError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("transcript-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()
        .map_err(|e| TranscriptError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| TranscriptError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| TranscriptError::Internal(format!("tempfile flush: {e}")))?;

    let document = RawDocument::with_format(tmp.path(), format)?;
    process_document(&document, config).await
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn process_sync(
    input_str: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<PipelineResult, TranscriptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranscriptError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(input_str, config))
}

/// Process a transcript and write the JSON report to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn process_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineResult, TranscriptError> {
    let result = process(input_str, config).await?;
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| TranscriptError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| TranscriptError::Internal(format!("Failed to serialise result: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(result)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Page images for a document: rasterised PDF pages, or the image itself.
async fn load_pages(
    document: &RawDocument,
    config: &PipelineConfig,
) -> Result<Vec<PageImage>, TranscriptError> {
    let pages = match document.format() {
        DocumentFormat::Pdf => {
            let rasterizer: Arc<dyn Rasterizer> = match config.rasterizer {
                Some(ref r) => Arc::clone(r),
                None => Arc::new(PdfiumRasterizer::from_config(config)),
            };
            rasterizer.rasterize(document.path()).await?
        }
        DocumentFormat::Image(_) => vec![rasterize::load_image(document.path()).await?],
    };

    if pages.is_empty() {
        return Err(TranscriptError::EmptyDocument {
            path: document.path().to_path_buf(),
        });
    }
    Ok(pages)
}
