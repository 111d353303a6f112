//! GlobeLayer - tiled raster imagery streaming for virtual globes
//!
//! This library resolves a remote TMS capabilities document
//! (`tilemapresource.xml`) into a concrete quadtree tiling scheme and then
//! fetches individual image tiles asynchronously on demand.
//!
//! # Pipeline
//!
//! ```text
//! RasterOverlay ──► capabilities fetch ──► ResolvedConfiguration
//!                                              │
//!                                              ▼
//!                                         TileProvider ──► RasterOverlayTile (many)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use globelayer::fetch::ReqwestFetcher;
//! use globelayer::geometry::QuadtreeTileId;
//! use globelayer::overlay::{LoadState, RasterOverlay};
//!
//! let overlay = RasterOverlay::new("http://host/tiles", Vec::new(), Default::default())?;
//! let fetcher = Arc::new(ReqwestFetcher::new()?);
//! let provider = overlay.create_tile_provider(fetcher).await?;
//!
//! let mut tile = provider.request_tile(QuadtreeTileId::new(2, 1, 3));
//! if let LoadState::Loaded(bytes) = tile.ready().await {
//!     // decode and render the tile
//! }
//! ```

pub mod capabilities;
pub mod fetch;
pub mod geometry;
pub mod logging;
pub mod overlay;
pub mod projection;

pub use capabilities::{ResolvedConfiguration, TileMapServiceOptions};
pub use geometry::{GlobeRectangle, QuadtreeTileId, QuadtreeTilingScheme, Rectangle};
pub use overlay::{LoadState, RasterOverlay, RasterOverlayTile, TileProvider};
pub use projection::Projection;
