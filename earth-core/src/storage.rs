//! Flat-file storage for downloaded images.
//!
//! Files are never updated or removed once written; the directory grows
//! with every successful fetch.

use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tokio::{
    fs::OpenOptions,
    io::{AsyncWrite, AsyncWriteExt},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    FetchError,
    config::StorageConfig,
    model::{ImageFormat, StoredImage},
};

pub const FILE_PREFIX: &str = "earth_image_";

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    /// Open the store, creating the directory if it is not there yet.
    pub fn open(dir: impl Into<PathBuf>, public_prefix: &str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image directory: {}", dir.display()))?;

        Ok(Self {
            dir,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.static_dir, &config.public_prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// `earth_image_<uuid>.<ext>`, fresh on every call.
    pub fn unique_file_name(format: ImageFormat) -> String {
        format!("{FILE_PREFIX}{}.{}", Uuid::new_v4(), format.extension())
    }

    /// Write `bytes` verbatim under a newly generated name.
    ///
    /// The file is opened with create-new semantics, so an existing file is
    /// never overwritten. A file that fails part-way through is removed.
    pub async fn store(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        captured_at: Option<String>,
    ) -> Result<StoredImage, FetchError> {
        let file_name = Self::unique_file_name(format);
        let path = self.dir.join(&file_name);

        let save_failed = |e: io::Error| {
            FetchError::UnknownError(format!("Failed to save image {}: {e}", path.display()))
        };

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(save_failed)?;
        write_or_discard(file, &path, bytes).await.map_err(save_failed)?;

        Ok(StoredImage {
            public_url: format!("{}/{}", self.public_prefix, file_name),
            file_name,
            path,
            format,
            size_bytes: bytes.len(),
            captured_at,
            stored_at: Utc::now(),
        })
    }
}

async fn write_or_discard<W>(mut out: W, path: &Path, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;

    if written.is_err() {
        drop(out);
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "failed to remove partial image");
        }
    }
    written
}
