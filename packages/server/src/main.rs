#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Locofinder API server binary.
//!
//! ```text
//! locofinder_server [--config locofinder.toml] [--port 8000]
//!                   [--bind-addr 127.0.0.1] [--data-path data/locations.parquet]
//! locofinder_server --interactive
//! ```

use std::path::PathBuf;

use clap::Parser;
use locofinder_server::{Overrides, ServerConfig};

#[derive(Parser)]
#[command(
    name = "locofinder_server",
    about = "Location search and recommendation API",
    version
)]
struct Cli {
    /// TOML config file (defaults to `$LOCOFINDER_CONFIG` if set)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long)]
    bind_addr: Option<String>,

    /// Location dataset (`.duckdb`, `.parquet` or `.csv`)
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Prompt for bind address, port and dataset before starting
    #[arg(long)]
    interactive: bool,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    config.apply_overrides(Overrides {
        bind_addr: cli.bind_addr,
        port: cli.port,
        data_path: cli.data_path,
    });

    if cli.interactive {
        locofinder_server::interactive::run(config).await?;
    } else {
        locofinder_server::run_server(config).await?;
    }

    Ok(())
}
