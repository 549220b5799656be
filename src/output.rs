//! Result types handed to the presentation layer.

use crate::error::TranscriptError;
use crate::pipeline::classify::Eligibility;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Everything a caller needs to show the outcome of one transcript.
///
/// `gpa` is `None` exactly when `eligibility` is [`Eligibility::GpaNotFound`],
/// and `name` is never empty (`"UNKNOWN"` when nothing was found).
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub name: String,
    pub gpa: Option<f64>,
    pub eligibility: Eligibility,
    /// One-sentence explanation of the verdict.
    pub summary: String,
    /// Concatenated OCR text of all pages, for manual review.
    pub ocr_text: String,
    /// The first page (or the image itself). Shares its buffer with the
    /// image the OCR engine read.
    #[serde(skip)]
    pub preview: Arc<DynamicImage>,
    pub stats: PipelineStats,
}

impl PipelineResult {
    /// GPA for display: two decimals, or `Not found`.
    pub fn gpa_display(&self) -> String {
        match self.gpa {
            Some(gpa) => format!("{:.2}", gpa),
            None => "Not found".to_string(),
        }
    }

    /// Write the preview image; the format follows the file extension.
    pub fn save_preview(&self, path: impl AsRef<Path>) -> Result<(), TranscriptError> {
        let path = path.as_ref();
        self.preview
            .save(path)
            .map_err(|e| TranscriptError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })
    }
}

/// Timing and size of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Pages handed to the OCR engine.
    pub page_count: usize,
    /// Time spent rasterising or decoding.
    pub rasterize_duration_ms: u64,
    /// Time spent in the OCR engine, all pages.
    pub ocr_duration_ms: u64,
    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
}
