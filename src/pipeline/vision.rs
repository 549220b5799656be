//! Vision OCR backend: transcribe a page with a multimodal LLM.
//!
//! Useful for phone photos and low-contrast scans where tesseract struggles.
//! The page goes out as a base64 PNG with the transcription prompt from
//! [`crate::prompts`]; the reply is taken verbatim as the page text. There is
//! one call per page and no retry: a failed call fails the run.

use crate::config::PipelineConfig;
use crate::error::TranscriptError;
use crate::pipeline::encode;
use crate::pipeline::ocr::OcrEngine;
use crate::prompts::OCR_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// [`OcrEngine`] backed by an edgequake-llm provider.
pub struct VisionOcrEngine {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl VisionOcrEngine {
    /// Build the engine from the configured provider settings.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, TranscriptError> {
        Ok(Self {
            provider: resolve_provider(config)?,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    fn name(&self) -> &str {
        "vision"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, TranscriptError> {
        let start = Instant::now();
        let image_data = encode::encode_page(image)
            .map_err(|e| TranscriptError::Internal(format!("PNG encoding failed: {}", e)))?;

        let messages = vec![
            ChatMessage::system(OCR_SYSTEM_PROMPT),
            ChatMessage::user_with_images("", vec![image_data]),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&build_options(self.temperature, self.max_tokens)))
            .await
            .map_err(|e| TranscriptError::OcrFailed {
                detail: format!("vision provider: {}", e),
            })?;

        debug!(
            "Vision OCR: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. Named provider (`config.provider_name`) with `config.model`.
/// 2. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` when both are set.
/// 3. OpenAI when `OPENAI_API_KEY` is set.
/// 4. `ProviderFactory::from_env` auto-detection.
fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, TranscriptError> {
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| TranscriptError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, TranscriptError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        TranscriptError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}
