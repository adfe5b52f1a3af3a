//! Binary crate for the `earth-web` planetary explorer.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Interactive configuration
//! - Serving the landing, Earth and Mars pages over HTTP

use clap::Parser;

mod cli;
mod pages;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
