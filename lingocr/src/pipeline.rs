//! Two-phase, language-adaptive extraction.
//!
//! ```text
//! Received → Decoding → Sniffing → Detecting → Resolving → Ensuring → Extracting → Done
//! ```
//!
//! Only decoding and the final extraction can fail the request. A failed
//! sniffing pass or an unidentifiable sample degrades to the default model.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::detection::{DetectionFailure, LanguageIdentifier};
use crate::error::{LingocrError, Result};
use crate::languages::{LanguageResolver, LanguageTag, ModelId};
use crate::ocr::{decode_image, Recognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Decoding,
    Sniffing,
    Detecting,
    Resolving,
    Ensuring,
    Extracting,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Decoding => "decoding",
            Self::Sniffing => "sniffing",
            Self::Detecting => "detecting",
            Self::Resolving => "resolving",
            Self::Ensuring => "ensuring",
            Self::Extracting => "extracting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one request. Built once, returned, never stored.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub detected_lang: Option<LanguageTag>,
    pub model: ModelId,
    pub text: String,
}

#[derive(Clone)]
pub struct OcrPipeline {
    recognizer: Recognizer,
    identifier: Arc<dyn LanguageIdentifier>,
    resolver: LanguageResolver,
    config: OcrConfig,
}

impl OcrPipeline {
    pub fn new(
        recognizer: Recognizer,
        identifier: Arc<dyn LanguageIdentifier>,
        config: &OcrConfig,
    ) -> Self {
        Self {
            recognizer,
            identifier,
            resolver: LanguageResolver::new(config.default_language()),
            config: config.clone(),
        }
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    pub async fn process(&self, bytes: Vec<u8>) -> Result<PipelineResult> {
        let result = self.run(bytes).await;
        if let Err(e) = &result {
            warn!(stage = %PipelineStage::Failed, "OCR pipeline aborted: {}", e);
        }
        result
    }

    async fn run(&self, bytes: Vec<u8>) -> Result<PipelineResult> {
        debug!(stage = %PipelineStage::Received, bytes = bytes.len());

        debug!(stage = %PipelineStage::Decoding);
        let config = self.config.clone();
        let image = tokio::task::spawn_blocking(move || decode_image(&bytes, &config))
            .await
            .map_err(|e| LingocrError::Internal(format!("decode task panicked: {e}")))??;

        debug!(stage = %PipelineStage::Sniffing, width = image.width(), height = image.height());
        let sample = self
            .recognizer
            .sniff(&image)
            .await
            .map(|result| result.text)
            .map_err(|e| DetectionFailure::SampleUnavailable(e.to_string()));

        debug!(stage = %PipelineStage::Detecting);
        let detection = sample.and_then(|text| self.identifier.identify(&text));
        if let Err(failure) = &detection {
            warn!(
                default = %self.resolver.default_model(),
                "Language detection failed, using default model: {}",
                failure
            );
        }
        let detected_lang = detection.ok();

        debug!(stage = %PipelineStage::Resolving);
        let model = self.resolver.resolve(detected_lang.as_ref());

        info!(
            detected_lang = detected_lang.as_ref().map(LanguageTag::as_str).unwrap_or("unknown"),
            model = %model,
            "Detected language"
        );

        // Ensuring happens inside the targeted pass.
        debug!(stage = %PipelineStage::Ensuring, model = %model);
        debug!(stage = %PipelineStage::Extracting, model = %model);
        let result = self.recognizer.recognize_final(&image, model).await?;

        debug!(stage = %PipelineStage::Done, chars = result.text.chars().count());
        Ok(PipelineResult {
            detected_lang,
            model,
            text: result.text,
        })
    }
}
