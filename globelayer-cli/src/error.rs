//! CLI error types.

use thiserror::Error;

use globelayer::overlay::{OverlayError, TileError};

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `--header` argument was not in `Name: Value` form.
    #[error("invalid header '{0}', expected 'Name: Value'")]
    InvalidHeader(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] globelayer::fetch::FetchError),

    /// Overlay provisioning failed; no imagery is available.
    #[error("no imagery available: {0}")]
    Overlay(#[from] OverlayError),

    /// The requested tile failed to load.
    #[error("tile has no imagery: {0}")]
    Tile(#[from] TileError),

    /// Writing the tile payload to disk failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
