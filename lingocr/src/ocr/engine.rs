use std::path::PathBuf;

use leptess::{LepTess, Variable};

use crate::error::{LingocrError, Result};
use crate::languages::ModelId;

use super::decode::DecodedImage;

/// Which models the engine loads for one pass, and how it segments the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub models: Vec<ModelId>,
    /// Tesseract `--psm`; `None` keeps the engine default.
    pub page_seg_mode: Option<u8>,
}

impl RecognitionConfig {
    pub fn baseline(models: Vec<ModelId>) -> Self {
        Self {
            models,
            page_seg_mode: None,
        }
    }

    pub fn targeted(model: ModelId, page_seg_mode: u8) -> Self {
        Self {
            models: vec![model],
            page_seg_mode: Some(page_seg_mode),
        }
    }

    pub fn languages(&self) -> String {
        ModelId::join(&self.models)
    }
}

/// Blocking OCR backend. Callers run it on the blocking pool.
pub trait OcrEngine: Send + Sync {
    fn extract(&self, image: &DecodedImage, config: &RecognitionConfig) -> Result<String>;
}

/// Tesseract via leptess, reading models from the asset cache directory.
///
/// A fresh `LepTess` is initialised per call because the enabled language
/// set differs between the baseline and targeted passes. The OCR engine mode
/// stays at Tesseract's default (LSTM when available).
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    data_dir: PathBuf,
}

impl TesseractEngine {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn extract(&self, image: &DecodedImage, config: &RecognitionConfig) -> Result<String> {
        if config.models.is_empty() {
            return Err(LingocrError::Extraction("no language model enabled".to_string()));
        }

        let data_dir = self.data_dir.to_str().ok_or_else(|| {
            LingocrError::OcrUnavailable(format!(
                "tessdata directory is not valid UTF-8: {}",
                self.data_dir.display()
            ))
        })?;
        let languages = config.languages();

        let mut lt = LepTess::new(Some(data_dir), &languages).map_err(|e| {
            LingocrError::Extraction(format!("Failed to load models '{languages}': {e}"))
        })?;

        if let Some(psm) = config.page_seg_mode {
            lt.set_variable(Variable::TesseditPagesegMode, &psm.to_string())
                .map_err(|e| {
                    LingocrError::Extraction(format!("Failed to set page segmentation mode: {e:?}"))
                })?;
        }

        lt.set_image_from_mem(image.png_bytes())
            .map_err(|e| LingocrError::Extraction(format!("Failed to set image: {e}")))?;
        lt.get_utf8_text()
            .map_err(|e| LingocrError::Extraction(format!("Failed to extract text: {e}")))
    }
}
