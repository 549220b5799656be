//! Error types for the transcript-eligibility library.
//!
//! Every failure that stops a pipeline run is a [`TranscriptError`]. Soft
//! failures are not errors at all: a transcript whose GPA or name cannot be
//! found still produces a [`crate::output::PipelineResult`], with
//! `gpa = None` / `name = "UNKNOWN"` and a `GPA NOT FOUND` verdict.
//!
//! Variants are grouped into coarse [`ErrorKind`]s so callers can react to
//! "bad input" versus "the OCR engine broke" without matching every variant.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`TranscriptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document reference is not a usable file, URL, or format.
    InvalidInput,
    /// The PDF could not be opened or rasterised.
    Rasterization,
    /// The image could not be decoded or the OCR engine failed.
    OcrEngine,
    /// The pipeline configuration is invalid.
    Configuration,
    /// A result could not be written.
    Output,
    /// Unexpected internal failure.
    Internal,
}

/// All fatal errors returned by the transcript-eligibility library.
#[derive(Debug, Error)]
pub enum TranscriptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// Input file was not found at the given path.
    #[error("Transcript file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of pdf, png, jpg, jpeg.
    #[error("Unsupported transcript format '{extension}' for '{path}'\nSupported: pdf, png, jpg, jpeg")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rasteriser produced no pages at all.
    #[error("Document '{path}' produced no pages to recognise")]
    EmptyDocument { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium from https://github.com/bblanchon/pdfium-binaries and either\n\
  • place libpdfium next to the binary or in a system library directory, or\n\
  • set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The image file could not be decoded.
    #[error("Could not decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The OCR engine binary could not be started.
    #[error("OCR engine '{engine}' is not available: {detail}\nInstall tesseract-ocr or pass --tesseract-path.")]
    OcrEngineUnavailable { engine: String, detail: String },

    /// The OCR engine ran but failed on this image.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    /// The vision OCR provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TranscriptError {
    /// The coarse category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidInput { .. }
            | TranscriptError::FileNotFound { .. }
            | TranscriptError::PermissionDenied { .. }
            | TranscriptError::UnsupportedFormat { .. }
            | TranscriptError::DownloadFailed { .. }
            | TranscriptError::DownloadTimeout { .. } => ErrorKind::InvalidInput,

            TranscriptError::NotAPdf { .. }
            | TranscriptError::CorruptPdf { .. }
            | TranscriptError::PasswordRequired { .. }
            | TranscriptError::WrongPassword { .. }
            | TranscriptError::RasterisationFailed { .. }
            | TranscriptError::EmptyDocument { .. }
            | TranscriptError::PdfiumBindingFailed(_) => ErrorKind::Rasterization,

            TranscriptError::ImageDecode { .. }
            | TranscriptError::OcrEngineUnavailable { .. }
            | TranscriptError::OcrFailed { .. }
            | TranscriptError::ProviderNotConfigured { .. } => ErrorKind::OcrEngine,

            TranscriptError::InvalidConfig(_) => ErrorKind::Configuration,
            TranscriptError::OutputWriteFailed { .. } => ErrorKind::Output,
            TranscriptError::Internal(_) => ErrorKind::Internal,
        }
    }
}
