//! Quadtree tile addressing.
//!
//! A [`QuadtreeTilingScheme`] covers a projected root rectangle with a grid
//! of `root_tiles_x` by `root_tiles_y` level-zero tiles and subdivides each
//! tile into four children per level. Tiles are addressed by
//! [`QuadtreeTileId`] with the origin in the south-west corner, matching the
//! TMS convention (y increases northward).

use std::fmt;

use crate::geometry::Rectangle;

/// Address of one tile in a quadtree tiling scheme.
///
/// Valid ids satisfy `x < root_tiles_x * 2^level` and
/// `y < root_tiles_y * 2^level`; validity is the caller's responsibility.
/// Out-of-range ids are not an error, they simply address a rectangle
/// outside the scheme's root rectangle, which downstream logic treats as
/// "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuadtreeTileId {
    /// Zoom level, 0 is the root.
    pub level: u32,
    /// Column, increasing eastward.
    pub x: u32,
    /// Row, increasing northward.
    pub y: u32,
}

impl QuadtreeTileId {
    /// Creates a tile id.
    pub fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// The four children of this tile, one level deeper.
    pub fn children(&self) -> [QuadtreeTileId; 4] {
        let level = self.level + 1;
        let x = self.x * 2;
        let y = self.y * 2;
        [
            QuadtreeTileId::new(level, x, y),
            QuadtreeTileId::new(level, x + 1, y),
            QuadtreeTileId::new(level, x, y + 1),
            QuadtreeTileId::new(level, x + 1, y + 1),
        ]
    }
}

impl fmt::Display for QuadtreeTileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} ({}, {})", self.level, self.x, self.y)
    }
}

/// Uniform quadtree subdivision of a projected rectangle.
///
/// Immutable after construction. The root rectangle is split into
/// `root_tiles_x * root_tiles_y` level-zero tiles; every level doubles the
/// tile count on each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadtreeTilingScheme {
    rectangle: Rectangle,
    root_tiles_x: u32,
    root_tiles_y: u32,
}

impl QuadtreeTilingScheme {
    /// Creates a tiling scheme over `rectangle` with the given root grid.
    ///
    /// Both root tile counts must be at least 1.
    pub fn new(rectangle: Rectangle, root_tiles_x: u32, root_tiles_y: u32) -> Self {
        debug_assert!(root_tiles_x >= 1 && root_tiles_y >= 1);
        Self {
            rectangle,
            root_tiles_x,
            root_tiles_y,
        }
    }

    /// The full projected rectangle covered by this scheme.
    pub fn rectangle(&self) -> &Rectangle {
        &self.rectangle
    }

    /// Number of level-zero tiles on the x axis.
    pub fn root_tiles_x(&self) -> u32 {
        self.root_tiles_x
    }

    /// Number of level-zero tiles on the y axis.
    pub fn root_tiles_y(&self) -> u32 {
        self.root_tiles_y
    }

    /// Tile counts `(x, y)` at the given level.
    ///
    /// Saturates at `u32::MAX` for levels too deep to represent, so absurd
    /// ids stay on the no-failure path instead of overflowing.
    pub fn tiles_at_level(&self, level: u32) -> (u32, u32) {
        let per_root = 1u32.checked_shl(level);
        let saturating = |root: u32| {
            per_root
                .and_then(|n| root.checked_mul(n))
                .unwrap_or(u32::MAX)
        };
        (saturating(self.root_tiles_x), saturating(self.root_tiles_y))
    }

    /// Returns true if `id` addresses a tile inside the scheme's grid.
    pub fn contains(&self, id: &QuadtreeTileId) -> bool {
        let (tiles_x, tiles_y) = self.tiles_at_level(id.level);
        id.x < tiles_x && id.y < tiles_y
    }

    /// Projected rectangle of the addressed tile.
    ///
    /// The y axis follows the TMS convention: `y = 0` is the southernmost
    /// row. Deterministic for any id; see [`QuadtreeTileId`] for the
    /// out-of-range contract.
    pub fn tile_rectangle(&self, id: &QuadtreeTileId) -> Rectangle {
        let (tiles_x, tiles_y) = self.tiles_at_level(id.level);
        let tile_width = self.rectangle.width() / tiles_x as f64;
        let tile_height = self.rectangle.height() / tiles_y as f64;

        // Every edge is computed from the root corner so adjacent tiles
        // share bit-identical boundaries; `west + tile_width` rounds
        // differently than the neighbour's own west.
        Rectangle::new(
            self.rectangle.west + id.x as f64 * tile_width,
            self.rectangle.south + id.y as f64 * tile_height,
            self.rectangle.west + (id.x as f64 + 1.0) * tile_width,
            self.rectangle.south + (id.y as f64 + 1.0) * tile_height,
        )
    }
}
