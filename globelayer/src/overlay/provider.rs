//! Tile provider: per-tile URL construction and fetch dispatch.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::capabilities::ResolvedConfiguration;
use crate::fetch::AssetFetcher;
use crate::geometry::{QuadtreeTileId, QuadtreeTilingScheme, Rectangle};
use crate::overlay::{LoadState, RasterOverlayTile, TileError};
use crate::projection::Projection;

/// Stateless-per-request tile factory.
///
/// Built once from a [`ResolvedConfiguration`] and shared freely; every
/// request is independent. Two requests for the same tile id issue two
/// independent fetches and return two independent handles.
#[derive(Clone)]
pub struct TileProvider {
    config: Arc<ResolvedConfiguration>,
    fetcher: Arc<dyn AssetFetcher>,
}

impl TileProvider {
    pub(crate) fn new(config: Arc<ResolvedConfiguration>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// The full resolved configuration this provider serves from.
    pub fn configuration(&self) -> &ResolvedConfiguration {
        &self.config
    }

    /// Projection shared by the tiling scheme and coverage rectangle.
    pub fn projection(&self) -> Projection {
        self.config.projection
    }

    /// Quadtree subdivision of the tiling extent.
    pub fn tiling_scheme(&self) -> &QuadtreeTilingScheme {
        &self.config.tiling_scheme
    }

    /// Projected region the source actually has imagery for.
    pub fn coverage_rectangle(&self) -> &Rectangle {
        &self.config.coverage_rectangle
    }

    /// Tile width in pixels.
    pub fn tile_width(&self) -> u32 {
        self.config.tile_width
    }

    /// Tile height in pixels.
    pub fn tile_height(&self) -> u32 {
        self.config.tile_height
    }

    /// Lowest available zoom level.
    pub fn minimum_level(&self) -> u32 {
        self.config.minimum_level
    }

    /// Highest available zoom level.
    pub fn maximum_level(&self) -> u32 {
        self.config.maximum_level
    }

    /// Attribution text, if the overlay configured one.
    pub fn credit(&self) -> Option<&str> {
        self.config.credit.as_deref()
    }

    /// Projected rectangle of the addressed tile.
    pub fn tile_rectangle(&self, id: &QuadtreeTileId) -> Rectangle {
        self.config.tiling_scheme.tile_rectangle(id)
    }

    /// Whether the addressed tile overlaps the coverage rectangle at all.
    ///
    /// Out-of-coverage tiles are valid requests that servers answer with
    /// 404; consumers use this to skip them up front.
    pub fn tile_in_coverage(&self, id: &QuadtreeTileId) -> bool {
        self.config
            .coverage_rectangle
            .overlaps(&self.tile_rectangle(id))
    }

    /// The URL the addressed tile would be fetched from.
    ///
    /// Tile paths are `{level}/{x}/{y}{extension}` resolved against the
    /// trailing-slash-normalized base URL, byte-for-byte the layout tile
    /// servers expect.
    pub fn tile_url(&self, id: &QuadtreeTileId) -> Result<Url, TileError> {
        let path = format!(
            "{}/{}/{}{}",
            id.level, id.x, id.y, self.config.file_extension
        );
        self.config
            .base_url
            .join(&path)
            .map_err(|e| TileError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Requests the raw bytes of one tile.
    ///
    /// Returns a handle immediately in [`LoadState::Loading`]; an
    /// independent fetch task delivers the terminal state. No caching or
    /// deduplication happens at this layer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_tile(&self, id: QuadtreeTileId) -> RasterOverlayTile {
        let url = match self.tile_url(&id) {
            Ok(url) => url,
            Err(error) => {
                warn!(tile = %id, %error, "tile request failed before fetch");
                return RasterOverlayTile::failed(id, error);
            }
        };

        debug!(tile = %id, %url, "requesting tile");

        let (tx, rx) = watch::channel(LoadState::Loading);
        let fetcher = Arc::clone(&self.fetcher);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            let state = match fetcher.fetch(url.clone(), &config.headers).await {
                Ok(bytes) => {
                    debug!(tile = %id, bytes = bytes.len(), "tile loaded");
                    LoadState::Loaded(bytes)
                }
                Err(error) => {
                    warn!(tile = %id, %url, %error, "tile fetch failed");
                    LoadState::Failed(TileError::Fetch(error))
                }
            };
            // The receiver may have been dropped; the result is simply
            // abandoned in that case.
            let _ = tx.send(state);
        });

        RasterOverlayTile::new(id, rx)
    }
}
