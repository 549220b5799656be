//! # transcript-eligibility
//!
//! Read a student's name and GPA off a scanned transcript (PDF, PNG or JPEG)
//! with OCR, then classify eligibility against a GPA threshold.
//!
//! ## Pipeline Overview
//!
//! ```text
//! transcript
//!  │
//!  ├─ 1. Input      resolve local file or download from URL; infer format
//!  ├─ 2. Rasterise  PDF pages via pdfium (spawn_blocking), or decode the image
//!  ├─ 3. OCR        tesseract (default) or a vision LLM, page by page
//!  ├─ 4. Extract    name + GPA heuristics over the joined text
//!  └─ 5. Classify   ELIGIBLE / REVIEW RECOMMENDED / NOT ELIGIBLE / GPA NOT FOUND
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transcript_eligibility::{process, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder().threshold(7.5).build()?;
//!     let result = process("transcript.pdf", &config).await?;
//!     println!("{}: GPA {} → {}", result.name, result.gpa_display(), result.eligibility);
//!     println!("{}", result.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Extraction rules
//!
//! The heuristics are deliberately simple and order-sensitive; see
//! [`pipeline::extract`]. The last labelled GPA in the document wins, and a
//! missing GPA is a `GPA NOT FOUND` verdict rather than an error.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `transcript-check` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrBackend, PipelineConfig, PipelineConfigBuilder, DEFAULT_THRESHOLD};
pub use error::{ErrorKind, TranscriptError};
pub use output::{PipelineResult, PipelineStats};
pub use pipeline::classify::{evaluate, Eligibility};
pub use pipeline::extract::{extract, extract_gpa, extract_name, ExtractionResult, UNKNOWN_NAME};
pub use pipeline::input::{DocumentFormat, ImageKind, RawDocument};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use pipeline::rasterize::{PageImage, PdfiumRasterizer, Rasterizer};
pub use pipeline::vision::VisionOcrEngine;
pub use process::{process, process_bytes, process_document, process_sync, process_to_file};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
