//! Statistical language identification over OCR sample text.
//!
//! Detection is allowed to fail: the pipeline consumes the
//! `Result<LanguageTag, DetectionFailure>` and falls back to the default model
//! instead of aborting.

use thiserror::Error;
use whatlang::Lang;

use crate::config::OcrConfig;
use crate::languages::LanguageTag;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionFailure {
    #[error("sample text is empty")]
    EmptySample,

    #[error("language could not be determined")]
    Undetermined,

    #[error("no sample available: {0}")]
    SampleUnavailable(String),
}

pub trait LanguageIdentifier: Send + Sync {
    fn identify(&self, text: &str) -> Result<LanguageTag, DetectionFailure>;
}

/// Trigram-based identifier backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangIdentifier {
    require_reliable: bool,
}

impl WhatlangIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject detections whatlang itself flags as unreliable.
    pub fn strict() -> Self {
        Self {
            require_reliable: true,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        if config.strict_detection {
            Self::strict()
        } else {
            Self::new()
        }
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Result<LanguageTag, DetectionFailure> {
        if !text.chars().any(char::is_alphabetic) {
            return Err(DetectionFailure::EmptySample);
        }

        let info = whatlang::detect(text).ok_or(DetectionFailure::Undetermined)?;
        if self.require_reliable && !info.is_reliable() {
            tracing::debug!(
                lang = info.lang().code(),
                confidence = info.confidence(),
                "Discarding unreliable detection"
            );
            return Err(DetectionFailure::Undetermined);
        }

        Ok(LanguageTag::new(tag_for(info.lang())))
    }
}

/// Two-letter tags for the languages the model table knows about. Anything
/// else keeps whatlang's three-letter code, which the resolver will not find.
fn tag_for(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Ara => "ar",
        Lang::Tur => "tr",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh-cn",
        Lang::Nld => "nl",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Nob => "no",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Hun => "hu",
        Lang::Ron => "ro",
        Lang::Slk => "sk",
        Lang::Srp => "sr",
        Lang::Ukr => "uk",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        other => other.code(),
    }
}
