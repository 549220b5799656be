//! OCR engines: page image → plain text.
//!
//! The pipeline only depends on the [`OcrEngine`] trait. Two engines ship
//! with the crate:
//!
//! * [`TesseractEngine`] (default): runs the local `tesseract` executable
//!   on a scratch PNG and reads the text from stdout.
//! * [`crate::pipeline::vision::VisionOcrEngine`]: asks a multimodal LLM to
//!   transcribe the page.
//!
//! Engines are best-effort: a blank page yields an empty string, not an
//! error. They are called once per page with no retries.

use crate::config::{OcrBackend, PipelineConfig};
use crate::error::TranscriptError;
use crate::pipeline::encode;
use crate::pipeline::vision::VisionOcrEngine;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Converts one image into plain text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "ocr"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, TranscriptError>;
}

/// [`OcrEngine`] that shells out to the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    psm: Option<u8>,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            psm: None,
        }
    }
}

impl TesseractEngine {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
            psm: config.page_segmentation_mode,
        }
    }

    /// Arguments for `tesseract <input> stdout -l <lang> [--psm N]`.
    fn args(&self, input: &std::path::Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec![
            input.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.language.clone().into(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".into());
            args.push(psm.to_string().into());
        }
        args
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, TranscriptError> {
        let png = encode::encode_png(image)
            .map_err(|e| TranscriptError::Internal(format!("PNG encoding failed: {}", e)))?;

        let scratch = tempfile::TempDir::new()
            .map_err(|e| TranscriptError::Internal(format!("tempdir: {e}")))?;
        let input = scratch.path().join("page.png");
        tokio::fs::write(&input, &png)
            .await
            .map_err(|e| TranscriptError::Internal(format!("Failed to write scratch PNG: {}", e)))?;

        let output = Command::new(&self.binary)
            .args(self.args(&input))
            .output()
            .await
            .map_err(|e| TranscriptError::OcrEngineUnavailable {
                engine: self.binary.display().to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TranscriptError::OcrFailed {
                detail: format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} chars", text.len());
        Ok(text)
    }
}

/// Pick the OCR engine for a run: the injected engine if any, otherwise the
/// configured backend.
pub fn resolve_engine(config: &PipelineConfig) -> Result<Arc<dyn OcrEngine>, TranscriptError> {
    if let Some(ref engine) = config.ocr_engine {
        return Ok(Arc::clone(engine));
    }

    match config.ocr_backend {
        OcrBackend::Tesseract => Ok(Arc::new(TesseractEngine::from_config(config))),
        OcrBackend::Vision => Ok(Arc::new(VisionOcrEngine::from_config(config)?)),
    }
}
