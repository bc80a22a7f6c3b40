use std::sync::Arc;

use tracing::{debug, warn};

use crate::assets::ModelFetcher;
use crate::error::{LingocrError, Result};
use crate::languages::ModelId;

use super::decode::DecodedImage;
use super::engine::{OcrEngine, RecognitionConfig};

/// Text produced by one engine pass, with the configuration that produced it.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    pub text: String,
    pub config: RecognitionConfig,
}

/// Baseline (multi-language sniffing) and targeted (single-language) passes
/// over the same engine. Both make sure the models they need are cached first.
#[derive(Clone)]
pub struct Recognizer {
    engine: Arc<dyn OcrEngine>,
    fetcher: ModelFetcher,
    baseline: Vec<ModelId>,
    page_seg_mode: u8,
}

impl Recognizer {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        fetcher: ModelFetcher,
        baseline: Vec<ModelId>,
        page_seg_mode: u8,
    ) -> Self {
        Self {
            engine,
            fetcher,
            baseline,
            page_seg_mode,
        }
    }

    pub fn baseline(&self) -> &[ModelId] {
        &self.baseline
    }

    pub fn fetcher(&self) -> &ModelFetcher {
        &self.fetcher
    }

    /// One pass with every baseline model enabled, to get text for language detection.
    pub async fn sniff(&self, image: &DecodedImage) -> Result<RecognitionResult> {
        for (id, outcome) in self.fetcher.ensure_many(&self.baseline).await {
            if !outcome.is_available() {
                warn!(model = %id, "Baseline model unavailable, sniffing may fail");
            }
        }

        let mut result = self
            .run(image, RecognitionConfig::baseline(self.baseline.clone()))
            .await?;
        result.text = result.text.trim().to_string();
        Ok(result)
    }

    /// Final pass with only `model` enabled.
    ///
    /// Layout is kept as the engine produced it; only the trailing newline and
    /// page separator are dropped.
    ///
    /// A failed download is not fatal here: the engine is still invoked and
    /// decides whether it can run with what is on disk.
    pub async fn recognize_final(
        &self,
        image: &DecodedImage,
        model: ModelId,
    ) -> Result<RecognitionResult> {
        let outcome = self.fetcher.ensure(model).await;
        if !outcome.is_available() {
            warn!(model = %model, "Model download failed, attempting extraction anyway");
        }

        let mut result = self
            .run(image, RecognitionConfig::targeted(model, self.page_seg_mode))
            .await?;
        result.text.truncate(result.text.trim_end().len());
        Ok(result)
    }

    async fn run(
        &self,
        image: &DecodedImage,
        config: RecognitionConfig,
    ) -> Result<RecognitionResult> {
        let engine = Arc::clone(&self.engine);
        let image = image.clone();
        let pass_config = config.clone();

        debug!(languages = %config.languages(), psm = ?config.page_seg_mode, "Running OCR pass");

        let text = tokio::task::spawn_blocking(move || engine.extract(&image, &pass_config))
            .await
            .map_err(|e| LingocrError::Extraction(format!("OCR task panicked: {e}")))??;

        Ok(RecognitionResult { text, config })
    }
}
