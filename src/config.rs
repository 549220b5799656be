//! Configuration types for transcript processing.
//!
//! Every knob of a pipeline run lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The GPA threshold is the only setting that
//! changes the verdict; everything else selects and tunes the collaborators
//! (pdfium rasteriser, OCR engine).
//!
//! Collaborators can also be injected directly (`ocr_engine`, `rasterizer`),
//! which takes precedence over the backend settings. Tests use this to run
//! the whole pipeline without pdfium or tesseract installed.

use crate::error::TranscriptError;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::rasterize::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default eligibility threshold.
pub const DEFAULT_THRESHOLD: f64 = 8.0;

/// Configuration for a transcript pipeline run.
///
/// # Example
/// ```rust
/// use transcript_eligibility::{OcrBackend, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .threshold(7.5)
///     .dpi(300)
///     .ocr_backend(OcrBackend::Tesseract)
///     .language("eng")
///     .build()
///     .unwrap();
/// assert_eq!(config.threshold, 7.5);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Minimum GPA to qualify as eligible. Nominal range 0.0–10.0. Default: 8.0.
    ///
    /// Values outside the nominal range are accepted; they only change which
    /// verdict fires.
    pub threshold: f64,

    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Path to an existing libpdfium. If None, the working directory and then
    /// the system library path are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Which OCR engine to build when `ocr_engine` is not injected. Default: Tesseract.
    pub ocr_backend: OcrBackend,

    /// Tesseract executable. Default: `tesseract` (resolved via `PATH`).
    pub tesseract_path: PathBuf,

    /// Tesseract language code(s), e.g. `eng` or `eng+hin`. Default: `eng`.
    pub language: String,

    /// Tesseract page segmentation mode (`--psm`). Default: engine default.
    pub page_segmentation_mode: Option<u8>,

    /// Vision provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Vision model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// Sampling temperature for the vision backend. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens the vision backend may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed OCR engine. Takes precedence over `ocr_backend`.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Pre-constructed rasteriser. Takes precedence over the pdfium default.
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dpi: 200,
            max_rendered_pixels: 4000,
            password: None,
            pdfium_library: None,
            ocr_backend: OcrBackend::default(),
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_segmentation_mode: None,
            provider_name: None,
            model: None,
            temperature: 0.0,
            max_tokens: 4096,
            download_timeout_secs: 120,
            ocr_engine: None,
            rasterizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("threshold", &self.threshold)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pdfium_library", &self.pdfium_library)
            .field("ocr_backend", &self.ocr_backend)
            .field("tesseract_path", &self.tesseract_path)
            .field("language", &self.language)
            .field("page_segmentation_mode", &self.page_segmentation_mode)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|e| e.name()))
            .field(
                "rasterizer",
                &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn ocr_backend(mut self, backend: OcrBackend) -> Self {
        self.config.ocr_backend = backend;
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn page_segmentation_mode(mut self, psm: u8) -> Self {
        self.config.page_segmentation_mode = Some(psm);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, TranscriptError> {
        let c = &self.config;
        if !c.threshold.is_finite() {
            return Err(TranscriptError::InvalidConfig(format!(
                "GPA threshold must be a finite number, got {}",
                c.threshold
            )));
        }
        if c.language.trim().is_empty() {
            return Err(TranscriptError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if let Some(psm) = c.page_segmentation_mode {
            if psm > 13 {
                return Err(TranscriptError::InvalidConfig(format!(
                    "Page segmentation mode must be 0–13, got {}",
                    psm
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// OCR engine used when no engine is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OcrBackend {
    /// Local `tesseract` executable. (default)
    #[default]
    Tesseract,
    /// Multimodal LLM transcription via edgequake-llm.
    Vision,
}
