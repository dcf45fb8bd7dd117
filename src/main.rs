//! CLI binary serving the climate API.
//!
//! # Usage
//!
//! ```bash
//! climate-api                                  # ./resources on 127.0.0.1:5000
//! climate-api --dataset-dir /data/hawaii --port 8080
//! CLIMATE_HOST=0.0.0.0 RUST_LOG=debug climate-api
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use climate_api::server::{self, ServerConfig};
use climate_api::DatasetLoader;
use log::info;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "climate-api")]
#[command(about = "Read-only JSON API over a daily weather-observation dataset")]
#[command(version)]
struct Args {
    /// Directory holding hawaii_stations and hawaii_measurements (.csv or .parquet)
    #[arg(long, env = "CLIMATE_DATASET_DIR", default_value = "resources")]
    dataset_dir: PathBuf,

    /// Address to bind
    #[arg(long, env = "CLIMATE_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for web server
    #[arg(short, long, env = "CLIMATE_PORT", default_value = "5000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let loader = DatasetLoader::new(&args.dataset_dir);
    info!("Loading dataset from {}", loader.dir().display());
    let store = loader
        .load()
        .await
        .with_context(|| format!("failed to load dataset from {}", loader.dir().display()))?;

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    server::run_server(store, config).await?;

    Ok(())
}
