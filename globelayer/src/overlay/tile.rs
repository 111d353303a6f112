//! Per-tile asynchronous result handle.

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::watch;

use crate::fetch::FetchError;
use crate::geometry::QuadtreeTileId;

/// Why a tile ended up in [`LoadState::Failed`].
///
/// Tile failures are local: they never affect sibling tiles or the overlay
/// that issued them.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// The byte fetch for this tile failed.
    #[error("tile fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The tile path could not be resolved against the base URL.
    #[error("invalid tile URL: {0}")]
    InvalidUrl(String),

    /// The fetch task ended without delivering a result.
    #[error("tile fetch task ended without delivering a result")]
    Abandoned,
}

/// Lifecycle of one tile request.
///
/// Transitions are one-directional: `Loading` moves to exactly one of
/// `Loaded` or `Failed` and never reopens.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// The fetch is still in flight.
    Loading,
    /// The raw tile payload arrived.
    Loaded(Bytes),
    /// The fetch failed; see the error for details.
    Failed(TileError),
}

impl LoadState {
    /// True once the state is `Loaded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

/// Handle for one addressed tile's raw payload.
///
/// Returned immediately by [`crate::overlay::TileProvider::request_tile`]
/// in `Loading` state; the owning fetch task delivers the terminal state
/// exactly once through a watch channel. Dropping the handle abandons the
/// result without cancelling or blocking the fetch.
#[derive(Debug)]
pub struct RasterOverlayTile {
    id: QuadtreeTileId,
    state: watch::Receiver<LoadState>,
}

impl RasterOverlayTile {
    pub(crate) fn new(id: QuadtreeTileId, state: watch::Receiver<LoadState>) -> Self {
        Self { id, state }
    }

    /// Creates a handle that is already terminal, for requests that fail
    /// before any fetch is issued.
    pub(crate) fn failed(id: QuadtreeTileId, error: TileError) -> Self {
        let (_tx, rx) = watch::channel(LoadState::Failed(error));
        Self { id, state: rx }
    }

    /// The tile this handle addresses.
    pub fn id(&self) -> QuadtreeTileId {
        self.id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Waits for the terminal state.
    ///
    /// Resolves as soon as the fetch task delivers `Loaded` or `Failed`;
    /// returns immediately if it already has.
    pub async fn ready(&mut self) -> LoadState {
        match self.state.wait_for(LoadState::is_terminal).await {
            Ok(state) => state.clone(),
            // The sender was dropped without a terminal send, which only
            // happens if the fetch task died.
            Err(_) => LoadState::Failed(TileError::Abandoned),
        }
    }
}
