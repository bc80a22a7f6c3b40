use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::config::OcrConfig;
use crate::error::{LingocrError, Result};

/// A validated raster, re-encoded as PNG so the OCR engine only ever sees one format.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    png: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl DecodedImage {
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Decode raw image bytes (PNG, JPEG, GIF, WebP, ...) and check their dimensions.
///
/// Malformed bytes yield [`LingocrError::Decode`]; images outside the configured
/// dimension bounds yield [`LingocrError::Validation`].
pub fn decode_image(bytes: &[u8], config: &OcrConfig) -> Result<DecodedImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LingocrError::Decode(format!("Failed to read image: {e}")))?;

    let img = reader
        .decode()
        .map_err(|e| LingocrError::Decode(format!("Failed to decode image: {e}")))?;

    let (width, height) = img.dimensions();
    if width < config.min_image_dimension || height < config.min_image_dimension {
        return Err(LingocrError::Validation(format!(
            "Image too small: {}x{}, minimum {}x{}",
            width, height, config.min_image_dimension, config.min_image_dimension
        )));
    }
    if width > config.max_image_dimension || height > config.max_image_dimension {
        return Err(LingocrError::Validation(format!(
            "Image too large: {}x{}, maximum {}x{}",
            width, height, config.max_image_dimension, config.max_image_dimension
        )));
    }

    // PNG has no float sample formats.
    let img = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        other => other,
    };

    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| LingocrError::Decode(format!("Failed to encode image: {e}")))?;

    Ok(DecodedImage {
        png: output.into(),
        width,
        height,
    })
}
