//! OCR (Optical Character Recognition) Module
//!
//! Wraps the external Tesseract engine for the two passes of the pipeline.
//!
//! # Architecture
//!
//! - `OcrEngine` trait defines the blocking engine interface
//! - `TesseractEngine` implements it via leptess, loading models from the asset cache
//! - `Recognizer` runs the baseline (sniffing) and targeted passes on the blocking pool
//! - `decode_image` validates input bytes and normalises them to PNG
//!
//! # Usage
//!
//! ```rust,ignore
//! let image = decode_image(&bytes, &config.ocr)?;
//! let sample = recognizer.sniff(&image).await?;
//! let result = recognizer.recognize_final(&image, model).await?;
//! ```

mod decode;
mod engine;
mod recognizer;

pub use decode::{decode_image, DecodedImage};
pub use engine::{OcrEngine, RecognitionConfig, TesseractEngine};
pub use recognizer::{RecognitionResult, Recognizer};
