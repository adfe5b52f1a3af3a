use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use earth_core::Config;
use inquire::Text;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "earth-web", version, about = "Planetary explorer web front end")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "EARTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "earth_core=debug,tower_http=debug".
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Listen address, overrides `server.listen`.
        #[arg(short, long, env = "EARTH_LISTEN")]
        listen: Option<String>,

        /// Directory for downloaded images, overrides `storage.static_dir`.
        #[arg(long, env = "EARTH_STATIC_DIR")]
        static_dir: Option<PathBuf>,

        /// Imagery metadata endpoint, overrides `provider.metadata_url`.
        #[arg(long, env = "EARTH_METADATA_URL")]
        metadata_url: Option<String>,
    },

    /// Interactively edit and save the configuration file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { listen, static_dir, metadata_url } => {
                init_tracing(&self.log_level);

                let mut config = load_config(self.config.as_ref())?;
                if let Some(listen) = listen {
                    config.server.listen = listen;
                }
                if let Some(dir) = static_dir {
                    config.storage.static_dir = dir;
                }
                if let Some(url) = metadata_url {
                    config.provider.metadata_url = url;
                }
                config.validate()?;

                crate::server::serve(&config).await
            }
            Command::Configure => configure(self.config),
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).with_level(true).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn configure(path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(path.as_ref())?;

    config.provider.metadata_url = Text::new("Imagery metadata endpoint:")
        .with_default(&config.provider.metadata_url)
        .prompt()
        .context("Failed to read metadata endpoint")?;

    let static_dir = config.storage.static_dir.display().to_string();
    config.storage.static_dir = Text::new("Directory for downloaded images:")
        .with_default(&static_dir)
        .prompt()
        .context("Failed to read image directory")?
        .into();

    config.storage.public_prefix = Text::new("URL prefix images are served under:")
        .with_default(&config.storage.public_prefix)
        .prompt()
        .context("Failed to read public prefix")?;

    config.server.listen = Text::new("Listen address:")
        .with_default(&config.server.listen)
        .prompt()
        .context("Failed to read listen address")?;

    config.validate()?;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Configuration saved to {}", saved_to.display());

    Ok(())
}
