use crate::core::VideoMetadata;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn suitable(&self, url: &Url) -> bool;
    async fn extract(&self, url: &Url) -> Result<VideoMetadata>;
}

#[derive(Default)]
pub struct ExtractorEngine {
    pub extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_extractor(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    pub async fn extract(&self, url: &str) -> Result<VideoMetadata> {
        let parsed_url = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        for extractor in &self.extractors {
            if extractor.suitable(&parsed_url) {
                debug!("Using {} extractor for {}", extractor.name(), parsed_url);
                return extractor.extract(&parsed_url).await;
            }
        }

        Err(Error::UnsupportedUrl(url.to_string()))
    }
}
