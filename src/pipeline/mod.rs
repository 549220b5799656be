//! Pipeline stages for transcript processing.
//!
//! Each submodule implements one step, so each can be tested alone and the
//! collaborators (rasteriser, OCR engine) can be swapped behind their traits.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ ocr ──▶ extract ──▶ classify
//! (path/URL)  (pdfium)   (text)  (name, GPA)  (verdict)
//! ```
//!
//! 1. [`input`]    : validate the path or download the URL; infer the format
//! 2. [`rasterize`]: PDF pages or the decoded image, as shared page images
//! 3. [`ocr`]      : tesseract or [`vision`] transcription, one page at a time
//! 4. [`extract`]  : name and GPA heuristics over the joined text
//! 5. [`classify`] : eligibility verdict and summary sentence

pub mod classify;
pub mod encode;
pub mod extract;
pub mod input;
pub mod ocr;
pub mod rasterize;
pub mod vision;
