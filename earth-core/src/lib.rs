//! Core library for the planetary explorer web front end.
//!
//! This crate defines:
//! - Configuration handling (endpoint, storage, listen address)
//! - The ordered validation rules for imagery form submissions
//! - Abstraction over imagery providers, plus the NASA Earth provider
//! - Local image storage and the fetch workflow tying it all together
//!
//! It is used by `earth-web`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;
pub mod validation;
pub mod workflow;

pub use config::{Config, ProviderConfig, ServerConfig, StorageConfig};
pub use error::{AreaRejection, FetchError};
pub use model::{AreaCode, ImageFormat, ImageRequest, StoredImage, ValidatedRequest};
pub use provider::{AssetMetadata, DownloadedImage, ImageryProvider};
pub use storage::ImageStore;
pub use workflow::ImageFetchWorkflow;
