use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{Config, FetchError, ValidatedRequest, provider::nasa::NasaEarthProvider};

pub mod nasa;

/// Metadata returned by the provider's lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetMetadata {
    #[serde(default)]
    pub url: Option<String>,
    /// Acquisition timestamp of the imagery.
    #[serde(default)]
    pub date: Option<String>,
}

impl AssetMetadata {
    /// The image URL, if the provider actually returned one.
    pub fn image_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Raw image body plus the content type the provider declared for it.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ImageryProvider: Send + Sync + Debug {
    /// Ask the provider which image covers the requested point and date.
    async fn lookup(&self, request: &ValidatedRequest) -> Result<AssetMetadata, FetchError>;

    /// Fetch the binary image a lookup pointed at.
    async fn download(&self, url: &str) -> Result<DownloadedImage, FetchError>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ImageryProvider>> {
    config.validate()?;
    Ok(Box::new(NasaEarthProvider::new(config.provider.metadata_url.clone())))
}
