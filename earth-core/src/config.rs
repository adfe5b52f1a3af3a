use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_METADATA_URL: &str = "https://api.nasa.gov/planetary/earth/assets";

/// Where imagery metadata is looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub metadata_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
        }
    }
}

/// Where downloaded images land and how they are exposed over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub static_dir: PathBuf,
    pub public_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            public_prefix: "/static".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// metadata_url = "https://api.nasa.gov/planetary/earth/assets"
///
/// [storage]
/// static_dir = "static"
/// public_prefix = "/static"
///
/// [server]
/// listen = "127.0.0.1:5000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load config from the platform location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "planetary-explorer", "earth-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check values that would otherwise only fail at request time or when routing.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.provider.metadata_url).with_context(|| {
            format!("Invalid provider metadata_url: {}", self.provider.metadata_url)
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Provider metadata_url must use http or https, got '{}'",
                url.scheme()
            );
        }

        let prefix = &self.storage.public_prefix;
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            bail!(
                "storage.public_prefix must start with '/' and name a path segment, \
                 got '{prefix}'.\n\
                 Hint: the default is \"/static\"."
            );
        }

        if self.storage.static_dir.as_os_str().is_empty() {
            bail!("storage.static_dir must not be empty");
        }

        Ok(())
    }
}
