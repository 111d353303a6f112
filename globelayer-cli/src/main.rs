//! GlobeLayer CLI - fetch tiles from a TMS imagery server.
//!
//! Provisions a raster overlay against a TMS endpoint and downloads one
//! tile, for smoke-testing servers and overlay options:
//!
//! ```text
//! globelayer http://host/tiles --level 2 -x 1 -y 3 --output tile.png
//! ```

mod error;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use globelayer::fetch::{AssetFetcher, ReqwestFetcher};
use globelayer::geometry::QuadtreeTileId;
use globelayer::logging::init_logging;
use globelayer::overlay::{LoadState, RasterOverlay};
use globelayer::TileMapServiceOptions;

use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "globelayer", about = "Fetch tiles from TMS imagery servers")]
struct Cli {
    /// Base URL of the TMS endpoint.
    url: String,

    /// Zoom level of the tile to fetch.
    #[arg(long, short = 'l')]
    level: u32,

    /// Tile column.
    #[arg(long, short = 'x')]
    x: u32,

    /// Tile row (TMS convention: 0 is the southernmost row).
    #[arg(long, short = 'y')]
    y: u32,

    /// Write the tile payload to this file instead of discarding it.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Override the tile file extension reported by the server.
    #[arg(long)]
    extension: Option<String>,

    /// Extra request header in 'Name: Value' form; repeatable.
    #[arg(long = "header")]
    headers: Vec<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| CliError::InvalidHeader(entry.clone()))
        })
        .collect()
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let headers = parse_headers(&cli.headers)?;

    let options = TileMapServiceOptions {
        file_extension: cli.extension,
        ..Default::default()
    };

    let overlay = RasterOverlay::new(&cli.url, headers, options)?;
    let fetcher = Arc::new(ReqwestFetcher::with_timeout(cli.timeout)?);

    let provider = overlay
        .create_tile_provider(fetcher as Arc<dyn AssetFetcher>)
        .await?;

    info!(
        projection = ?provider.projection(),
        minimum_level = provider.minimum_level(),
        maximum_level = provider.maximum_level(),
        "overlay provisioned"
    );
    if let Some(credit) = provider.credit() {
        info!(credit, "imagery attribution");
    }

    let id = QuadtreeTileId::new(cli.level, cli.x, cli.y);
    if !provider.tile_in_coverage(&id) {
        info!(tile = %id, "tile is outside the coverage rectangle");
    }

    let mut tile = provider.request_tile(id);
    match tile.ready().await {
        LoadState::Loaded(bytes) => {
            info!(tile = %id, bytes = bytes.len(), "tile loaded");
            if let Some(path) = cli.output {
                fs::write(&path, &bytes)?;
                info!(path = %path.display(), "tile written");
            }
            Ok(())
        }
        LoadState::Failed(e) => Err(e.into()),
        // ready() only resolves on terminal states.
        LoadState::Loading => unreachable!("ready() returned a non-terminal state"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging("logs", "globelayer.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
