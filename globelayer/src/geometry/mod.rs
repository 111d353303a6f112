//! Planar geometry for tile addressing.
//!
//! Provides the projected [`Rectangle`] and geodetic [`GlobeRectangle`]
//! value types and the [`QuadtreeTilingScheme`] that subdivides a projected
//! rectangle into a quadtree of addressable tiles.

mod rectangle;
mod tiling;

pub use rectangle::{GlobeRectangle, Rectangle};
pub use tiling::{QuadtreeTileId, QuadtreeTilingScheme};
