//! Language model identifiers and the tag → model resolution table.
//!
//! A [`LanguageTag`] is whatever the language identifier produced (ISO 639-1,
//! sometimes region-qualified such as `zh-cn`). A [`ModelId`] names a
//! Tesseract `traineddata` file. Resolution is an exact lookup in
//! [`LANGUAGE_MAP`]; anything not in the map resolves to the default model.

use std::fmt;

use serde::{Serialize, Serializer};

/// Every Tesseract model this service is willing to download.
pub const SUPPORTED_MODELS: &[&str] = &[
    "eng", "fra", "deu", "spa", "ita", "por", "rus", "ara", "tur", "jpn", "kor", "chi_sim",
    "chi_tra", "nld", "swe", "dan", "fin", "nor", "pol", "ces", "hun", "ron", "srp", "slk", "ukr",
    "vie", "tha", "ind", "msa",
];

/// Detected language tag → Tesseract model.
pub const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("en", "eng"),
    ("es", "spa"),
    ("fr", "fra"),
    ("de", "deu"),
    ("it", "ita"),
    ("pt", "por"),
    ("ru", "rus"),
    ("ar", "ara"),
    ("tr", "tur"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("zh-cn", "chi_sim"),
    ("zh-tw", "chi_tra"),
    ("nl", "nld"),
    ("sv", "swe"),
    ("da", "dan"),
    ("fi", "fin"),
    ("no", "nor"),
    ("pl", "pol"),
    ("cs", "ces"),
    ("hu", "hun"),
    ("ro", "ron"),
    ("sk", "slk"),
    ("sr", "srp"),
    ("uk", "ukr"),
    ("vi", "vie"),
    ("th", "tha"),
    ("id", "ind"),
    ("ms", "msa"),
];

/// Languages sampled together in the first, language-agnostic pass.
pub const DEFAULT_BASELINE: &[&str] = &["eng", "spa", "fra", "deu", "por"];

/// Identifier of a supported Tesseract language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(&'static str);

impl ModelId {
    pub const ENGLISH: ModelId = ModelId("eng");

    /// Look up a model code in the supported set. Matching is exact.
    pub fn from_code(code: &str) -> Option<Self> {
        SUPPORTED_MODELS
            .iter()
            .find(|supported| **supported == code)
            .map(|supported| ModelId(*supported))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn all() -> impl Iterator<Item = ModelId> {
        SUPPORTED_MODELS.iter().map(|code| ModelId(*code))
    }

    /// Tesseract's `-l` syntax for enabling several models in one pass.
    pub fn join(ids: &[ModelId]) -> String {
        ids.iter()
            .map(ModelId::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for ModelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Parse a comma-separated list of model codes, skipping unknown ones.
pub fn parse_model_list(value: &str) -> Vec<ModelId> {
    let mut ids = Vec::new();
    for code in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match ModelId::from_code(code) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => tracing::warn!(code, "Ignoring unsupported language model"),
        }
    }
    ids
}

/// Language code as reported by the language identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps detected tags onto models, falling back to a fixed default.
#[derive(Debug, Clone, Copy)]
pub struct LanguageResolver {
    default: ModelId,
}

impl LanguageResolver {
    pub fn new(default: ModelId) -> Self {
        Self { default }
    }

    pub fn default_model(&self) -> ModelId {
        self.default
    }

    /// Total: `None` (detection failed) and unmapped tags both yield the default.
    pub fn resolve(&self, tag: Option<&LanguageTag>) -> ModelId {
        tag.and_then(|tag| lookup(tag.as_str()))
            .unwrap_or(self.default)
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(ModelId::ENGLISH)
    }
}

fn lookup(tag: &str) -> Option<ModelId> {
    LANGUAGE_MAP
        .iter()
        .find(|(mapped, _)| *mapped == tag)
        .and_then(|(_, code)| ModelId::from_code(code))
}
