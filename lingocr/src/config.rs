use std::env;
use std::path::PathBuf;

use crate::languages::{parse_model_list, ModelId, DEFAULT_BASELINE};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse `OCR_BASELINE_LANGUAGES`.
/// Format: comma-separated model codes, e.g. `eng,spa,fra`. Unknown codes are
/// skipped; an empty result falls back to the built-in baseline.
fn parse_baseline() -> Vec<ModelId> {
    let builtin = DEFAULT_BASELINE.join(",");
    let raw = env::var("OCR_BASELINE_LANGUAGES").unwrap_or_else(|_| builtin.clone());
    let parsed = parse_model_list(&raw);
    if parsed.is_empty() {
        tracing::warn!(
            "OCR_BASELINE_LANGUAGES '{}' contains no supported models, using {}",
            raw,
            builtin
        );
        return parse_model_list(&builtin);
    }
    parsed
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetConfig,
    pub ocr: OcrConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where language models live locally and where they are fetched from.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub cache_dir: PathBuf,
    pub base_url: String,
    pub extension: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Models enabled together for the sniffing pass. The first entry is the
    /// fallback model when detection fails.
    pub baseline_languages: Vec<ModelId>,
    /// Tesseract page segmentation mode for the targeted pass.
    pub page_seg_mode: u8,
    pub max_image_dimension: u32,
    pub min_image_dimension: u32,
    /// Treat detections the identifier itself marks unreliable as undetermined.
    pub strict_detection: bool,
}

/// Limits applied when downloading the caller's image.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_bytes: u64,
}

impl OcrConfig {
    pub fn default_language(&self) -> ModelId {
        self.baseline_languages
            .first()
            .copied()
            .unwrap_or(ModelId::ENGLISH)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("tessdata"),
            base_url: "https://raw.githubusercontent.com/tesseract-ocr/tessdata_best/main"
                .to_string(),
            extension: "traineddata".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            baseline_languages: parse_model_list(&DEFAULT_BASELINE.join(",")),
            page_seg_mode: 6,
            max_image_dimension: 10000,
            min_image_dimension: 1,
            strict_detection: false,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_bytes: 26_214_400,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let assets = AssetConfig::default();
        let ocr = OcrConfig::default();
        let fetch = FetchConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("LINGOCR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("LINGOCR_PORT", 8000),
            },
            assets: AssetConfig {
                cache_dir: env::var("TESSDATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(assets.cache_dir),
                base_url: env::var("TESSDATA_BASE_URL").unwrap_or(assets.base_url),
                extension: env::var("TESSDATA_EXTENSION").unwrap_or(assets.extension),
                timeout_secs: parse_env_or("TESSDATA_TIMEOUT", assets.timeout_secs),
            },
            ocr: OcrConfig {
                baseline_languages: parse_baseline(),
                page_seg_mode: parse_env_or("OCR_PAGE_SEG_MODE", ocr.page_seg_mode),
                max_image_dimension: parse_env_or("OCR_MAX_DIMENSION", ocr.max_image_dimension),
                min_image_dimension: parse_env_or("OCR_MIN_DIMENSION", ocr.min_image_dimension),
                strict_detection: parse_env_or("OCR_STRICT_DETECTION", ocr.strict_detection),
            },
            fetch: FetchConfig {
                timeout_secs: parse_env_or("IMAGE_FETCH_TIMEOUT", fetch.timeout_secs),
                max_bytes: parse_env_or("IMAGE_MAX_BYTES", fetch.max_bytes),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
