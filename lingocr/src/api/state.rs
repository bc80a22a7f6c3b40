use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::OcrPipeline;

use super::source::ImageSource;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: OcrPipeline,
    /// Fetches caller-supplied image URLs.
    pub images: ImageSource,
}

impl AppState {
    pub fn new(config: Config, pipeline: OcrPipeline) -> Result<Self> {
        let images = ImageSource::new(&config.fetch)?;

        Ok(Self {
            config: Arc::new(config),
            pipeline,
            images,
        })
    }
}
