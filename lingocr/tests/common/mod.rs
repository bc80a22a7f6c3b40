#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat};

use lingocr::assets::{AssetStore, ModelFetcher};
use lingocr::config::{AssetConfig, Config, FetchConfig, OcrConfig, ServerConfig};
use lingocr::detection::{DetectionFailure, LanguageIdentifier};
use lingocr::error::{LingocrError, Result};
use lingocr::languages::{parse_model_list, LanguageTag};
use lingocr::ocr::{DecodedImage, OcrEngine, RecognitionConfig, Recognizer};
use lingocr::pipeline::OcrPipeline;

pub const BASELINE: &str = "eng,spa";

pub const ENGLISH_SAMPLE: &str =
    "The quick brown fox jumps over the lazy dog while the children play in the garden";
pub const SPANISH_SAMPLE: &str =
    "El rápido zorro marrón salta sobre el perro perezoso mientras los niños juegan en el jardín";

/// Encode a blank RGB image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut output = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    output
}

/// Stand-in for Tesseract.
///
/// Like the real engine it refuses to run unless every requested model is in
/// `data_dir`, and answers with canned text keyed by the language string
/// (`"eng+spa"`, `"fra"`, ...).
pub struct FakeEngine {
    data_dir: PathBuf,
    responses: HashMap<String, String>,
    calls: Mutex<Vec<RecognitionConfig>>,
}

impl FakeEngine {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, languages: &str, text: &str) -> Self {
        self.responses.insert(languages.to_string(), text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecognitionConfig> {
        self.calls.lock().unwrap().clone()
    }
}

impl OcrEngine for FakeEngine {
    fn extract(&self, _image: &DecodedImage, config: &RecognitionConfig) -> Result<String> {
        self.calls.lock().unwrap().push(config.clone());

        for model in &config.models {
            let path = self.data_dir.join(format!("{model}.traineddata"));
            let usable = std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
            if !usable {
                return Err(LingocrError::Extraction(format!(
                    "Failed to load model {model}"
                )));
            }
        }

        Ok(self
            .responses
            .get(&config.languages())
            .cloned()
            .unwrap_or_default())
    }
}

/// Identifier with a fixed answer.
pub struct FixedIdentifier(pub std::result::Result<LanguageTag, DetectionFailure>);

impl LanguageIdentifier for FixedIdentifier {
    fn identify(&self, _text: &str) -> std::result::Result<LanguageTag, DetectionFailure> {
        self.0.clone()
    }
}

pub fn test_config(cache_dir: &Path, asset_base_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        assets: AssetConfig {
            cache_dir: cache_dir.to_path_buf(),
            base_url: asset_base_url.to_string(),
            timeout_secs: 5,
            ..AssetConfig::default()
        },
        ocr: OcrConfig {
            baseline_languages: parse_model_list(BASELINE),
            ..OcrConfig::default()
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            ..FetchConfig::default()
        },
    }
}

pub fn build_pipeline(
    config: &Config,
    engine: Arc<FakeEngine>,
    identifier: Arc<dyn LanguageIdentifier>,
) -> OcrPipeline {
    let fetcher = ModelFetcher::with_client(
        AssetStore::from_config(&config.assets),
        reqwest::Client::new(),
        config.assets.base_url.clone(),
    );
    let recognizer = Recognizer::new(
        engine,
        fetcher,
        config.ocr.baseline_languages.clone(),
        config.ocr.page_seg_mode,
    );
    OcrPipeline::new(recognizer, identifier, &config.ocr)
}

/// Place a non-empty model file in the cache.
pub fn seed_model(dir: &Path, code: &str) {
    std::fs::write(dir.join(format!("{code}.traineddata")), b"cached-model")
        .expect("Failed to seed model");
}
