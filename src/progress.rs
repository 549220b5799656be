//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to be told when
//! pages are ready and as each page is recognised. OCR is the slow stage (a
//! few seconds per page with tesseract, longer with a vision model), so a
//! spinner that names the current page is the main use.
//!
//! # Example
//!
//! ```rust
//! use transcript_eligibility::{PipelineConfig, PipelineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     recognised: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_page_recognized(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         self.recognised.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} read ({} chars)", page_num, total_pages, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { recognised: AtomicUsize::new(0) });
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::classify::Eligibility;
use std::sync::Arc;

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for one run arrive sequentially, but the
/// same callback may be shared by concurrent runs, hence `Send + Sync`.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once the document reference has been resolved.
    fn on_pipeline_start(&self, document: &str) {
        let _ = document;
    }

    /// Called once all page images are available (after rasterisation for
    /// PDFs, after decoding for images).
    fn on_pages_ready(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the OCR engine.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when the OCR engine returns text for a page.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages
    /// * `text_len`   : byte length of the recognised text
    fn on_page_recognized(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once the verdict is known.
    fn on_pipeline_complete(&self, eligibility: Eligibility) {
        let _ = eligibility;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
