//! Overlay configuration types.
//!
//! [`TileMapServiceOptions`] carries the caller-supplied overrides that take
//! precedence over anything derived from the capabilities document.
//! [`ResolvedConfiguration`] is the immutable output of resolution, shared
//! read-only by every tile request.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::geometry::{QuadtreeTilingScheme, Rectangle};
use crate::projection::Projection;

/// Caller overrides for capability resolution.
///
/// Every field is optional; a present value wins over the corresponding
/// value derived from the capabilities document. Deserializable so overlay
/// definitions can live in configuration files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TileMapServiceOptions {
    /// Tile file extension, with or without the leading dot.
    pub file_extension: Option<String>,
    /// Tile width in pixels.
    pub tile_width: Option<u32>,
    /// Tile height in pixels.
    pub tile_height: Option<u32>,
    /// Lowest zoom level to request.
    pub minimum_level: Option<u32>,
    /// Highest zoom level to request.
    pub maximum_level: Option<u32>,
    /// Projection to use, skipping profile inference entirely.
    pub projection: Option<Projection>,
    /// Coverage rectangle in projected coordinates, superseding the
    /// document's bounding box.
    pub coverage_rectangle: Option<Rectangle>,
    /// Attribution text carried opaquely to the consumer.
    pub credit: Option<String>,
}

/// Fully-resolved overlay configuration.
///
/// Produced exactly once per overlay; immutable thereafter. The coverage
/// rectangle is a sub-rectangle of (or equal to) the tiling scheme's root
/// rectangle, and `minimum_level <= maximum_level` unless the caller forced
/// contradictory overrides.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    /// Projection shared by the tiling scheme and coverage rectangle.
    pub projection: Projection,
    /// Quadtree subdivision of the full tiling extent.
    pub tiling_scheme: QuadtreeTilingScheme,
    /// Projected region the source actually has imagery for.
    pub coverage_rectangle: Rectangle,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Lowest available zoom level.
    pub minimum_level: u32,
    /// Highest available zoom level.
    pub maximum_level: u32,
    /// Tile file extension, empty or starting with a dot.
    pub file_extension: String,
    /// Base URL tile paths are resolved against; always ends in a slash.
    pub base_url: Url,
    /// Headers sent with every tile request.
    pub headers: Vec<(String, String)>,
    /// Attribution text, if any.
    pub credit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_is_all_absent() {
        let options = TileMapServiceOptions::default();
        assert!(options.file_extension.is_none());
        assert!(options.tile_width.is_none());
        assert!(options.tile_height.is_none());
        assert!(options.minimum_level.is_none());
        assert!(options.maximum_level.is_none());
        assert!(options.projection.is_none());
        assert!(options.coverage_rectangle.is_none());
        assert!(options.credit.is_none());
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: TileMapServiceOptions = serde_json::from_str(
            r#"{"file_extension": "jpg", "minimum_level": 3, "projection": "web-mercator"}"#,
        )
        .unwrap();
        assert_eq!(options.file_extension.as_deref(), Some("jpg"));
        assert_eq!(options.minimum_level, Some(3));
        assert_eq!(options.projection, Some(Projection::WebMercator));
        assert!(options.maximum_level.is_none());
    }
}
