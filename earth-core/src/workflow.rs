use anyhow::Result;
use tracing::{info, instrument};

use crate::{
    Config, FetchError, ImageFormat, ImageRequest, StoredImage,
    provider::{ImageryProvider, provider_from_config},
    storage::ImageStore,
    validation,
};

/// Validate a submission, look the image up, download it and store it.
///
/// Each call is independent: the only state shared between concurrent runs
/// is the provider's HTTP client and the storage directory.
#[derive(Debug)]
pub struct ImageFetchWorkflow {
    provider: Box<dyn ImageryProvider>,
    store: ImageStore,
}

impl ImageFetchWorkflow {
    pub fn new(provider: Box<dyn ImageryProvider>, store: ImageStore) -> Self {
        Self { provider, store }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = provider_from_config(config)?;
        let store = ImageStore::from_config(&config.storage)?;
        Ok(Self::new(provider, store))
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    #[instrument(
        skip_all,
        fields(
            lat = %request.latitude,
            lon = %request.longitude,
            date = %request.date,
            area = %request.area,
        )
    )]
    pub async fn run(&self, request: &ImageRequest) -> Result<StoredImage, FetchError> {
        let validated = validation::validate(request)?;

        let metadata = self.provider.lookup(&validated).await?;
        let url = metadata.image_url().ok_or(FetchError::NoImageAvailable)?;

        let image = self.provider.download(url).await?;
        let format = ImageFormat::from_content_type(image.content_type.as_deref());

        let stored = self.store.store(&image.bytes, format, metadata.date.clone()).await?;

        info!(
            file = %stored.file_name,
            bytes = stored.size_bytes,
            format = format.extension(),
            resolution = validated.resolution(),
            "stored earth image"
        );

        Ok(stored)
    }
}
