//! Language-adaptive OCR service.
//!
//! An image is read twice: once with a small multi-language baseline to get a
//! text sample, and once with the single model matching the language detected
//! in that sample. Models are downloaded on first use into a local cache.

pub mod api;
pub mod assets;
pub mod config;
pub mod detection;
pub mod error;
pub mod languages;
pub mod ocr;
pub mod pipeline;
