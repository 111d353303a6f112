//! TMS capabilities resolution.
//!
//! Turns a `tilemapresource.xml` document plus caller overrides into a
//! [`ResolvedConfiguration`]: projection, tiling scheme, coverage rectangle,
//! tile pixel size, zoom range and file extension. This is where every
//! format heuristic lives, most importantly the gdal2tiles legacy rule: a
//! `mercator`/`geodetic` profile (without the `global-` prefix of the TMS
//! standard) expresses its bounding box in geodetic degrees rather than
//! projected units.
//!
//! Optional attributes are parsed leniently: malformed numeric text is
//! treated as absent and the default applies. Only an unparseable document
//! aborts resolution.

mod config;

pub use config::{ResolvedConfiguration, TileMapServiceOptions};

use elementtree::Element;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::geometry::{GlobeRectangle, QuadtreeTilingScheme, Rectangle};
use crate::projection::Projection;

/// Errors that abort capability resolution.
#[derive(Debug, Error)]
pub enum CapabilitiesError {
    /// The document is empty, not XML, or has no usable root element.
    #[error("malformed capabilities document: {0}")]
    Xml(String),
}

/// Tiling convention named by the `profile` attribute of `TileSets`.
///
/// The `global-` variants follow the TMS standard and express their
/// bounding box in projected units; the bare variants are emitted by
/// gdal2tiles and always use geodetic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// gdal2tiles Web Mercator; bounding box in degrees.
    Mercator,
    /// TMS-standard Web Mercator; bounding box in projected meters.
    GlobalMercator,
    /// gdal2tiles geographic; bounding box in degrees.
    Geodetic,
    /// TMS-standard geographic; bounding box in degrees either way.
    GlobalGeodetic,
}

impl Profile {
    /// Parses a profile identifier, or `None` for unrecognized values.
    pub fn parse(name: &str) -> Option<Profile> {
        match name {
            "mercator" => Some(Profile::Mercator),
            "global-mercator" => Some(Profile::GlobalMercator),
            "geodetic" => Some(Profile::Geodetic),
            "global-geodetic" => Some(Profile::GlobalGeodetic),
            _ => None,
        }
    }

    /// The projection this profile tiles in.
    pub fn projection(&self) -> Projection {
        match self {
            Profile::Mercator | Profile::GlobalMercator => Projection::WebMercator,
            Profile::Geodetic | Profile::GlobalGeodetic => Projection::Geographic,
        }
    }

    /// Whether the document's bounding box is expressed in geodetic degrees
    /// rather than projected units.
    pub fn bounding_box_in_degrees(&self) -> bool {
        // Only the TMS-standard mercator profile uses projected units; the
        // geodetic profiles are degrees by definition and bare "mercator"
        // is the gdal2tiles legacy convention.
        !matches!(self, Profile::GlobalMercator)
    }
}

/// Fixed (projection, root grid, degrees flag) tuple a profile or an
/// explicit projection override resolves to.
#[derive(Debug, Clone, Copy)]
struct TilingConvention {
    projection: Projection,
    root_tiles_x: u32,
    bounding_box_in_degrees: bool,
}

impl TilingConvention {
    fn from_profile(profile: Profile) -> Self {
        Self {
            projection: profile.projection(),
            root_tiles_x: root_tiles_x_for(profile.projection()),
            bounding_box_in_degrees: profile.bounding_box_in_degrees(),
        }
    }

    /// An explicit override skips profile inference; the bounding box, if
    /// any, is taken as already projected.
    fn from_override(projection: Projection) -> Self {
        Self {
            projection,
            root_tiles_x: root_tiles_x_for(projection),
            bounding_box_in_degrees: false,
        }
    }
}

/// The geographic tiling extent is twice as wide as tall, so it takes two
/// square root tiles; Web Mercator's square extent takes one.
fn root_tiles_x_for(projection: Projection) -> u32 {
    match projection {
        Projection::WebMercator => 1,
        Projection::Geographic => 2,
    }
}

/// Returns an attribute's text, treating a missing element as absent.
///
/// The name shares the element's lifetime because `get_attr` accepts any
/// qualified-name view tied to that borrow.
fn attr_string<'a>(element: Option<&'a Element>, name: &'a str) -> Option<&'a str> {
    element.and_then(|e| e.get_attr(name))
}

/// Parses an optional unsigned attribute; malformed text is absent.
fn attr_u32(element: Option<&Element>, name: &str) -> Option<u32> {
    let text = attr_string(element, name)?;
    match text.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(attribute = name, value = text, "ignoring unparseable integer attribute");
            None
        }
    }
}

/// Parses an optional floating-point attribute; malformed text is absent.
fn attr_f64(element: Option<&Element>, name: &str) -> Option<f64> {
    let text = attr_string(element, name)?;
    match text.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(attribute = name, value = text, "ignoring unparseable numeric attribute");
            None
        }
    }
}

/// Resolves a capabilities document into an overlay configuration.
///
/// `base_url` and `headers` are carried through unchanged for tile URL
/// construction. Overrides in `options` take absolute precedence over
/// document-derived values.
pub fn resolve_capabilities(
    document: &[u8],
    base_url: &Url,
    headers: &[(String, String)],
    options: &TileMapServiceOptions,
) -> Result<ResolvedConfiguration, CapabilitiesError> {
    let root = Element::from_reader(document).map_err(|e| CapabilitiesError::Xml(e.to_string()))?;

    let tile_format = root.find("TileFormat");
    let file_extension = options
        .file_extension
        .clone()
        .or_else(|| attr_string(tile_format, "extension").map(str::to_string))
        .unwrap_or_else(|| "png".to_string());
    let tile_width = options
        .tile_width
        .or_else(|| attr_u32(tile_format, "width"))
        .unwrap_or(256);
    let tile_height = options
        .tile_height
        .or_else(|| attr_u32(tile_format, "height"))
        .unwrap_or(256);

    let tile_sets = root.find("TileSets");

    let mut minimum_level = u32::MAX;
    let mut maximum_level = 0;
    if let Some(tile_sets) = tile_sets {
        for tile_set in tile_sets.find_all("TileSet") {
            let level = attr_u32(Some(tile_set), "order").unwrap_or(0);
            minimum_level = minimum_level.min(level);
            maximum_level = maximum_level.max(level);
        }
    }
    // With no TileSet children the scan leaves (u32::MAX, 0); the clamp
    // collapses that to (0, 0).
    minimum_level = minimum_level.min(maximum_level);

    let minimum_level = options.minimum_level.unwrap_or(minimum_level);
    let maximum_level = options.maximum_level.unwrap_or(maximum_level);

    let convention = match options.projection {
        Some(projection) => TilingConvention::from_override(projection),
        None => {
            let name = attr_string(tile_sets, "profile").unwrap_or("mercator");
            let profile = Profile::parse(name).unwrap_or_else(|| {
                warn!(profile = name, "unrecognized TMS profile, assuming mercator");
                Profile::Mercator
            });
            TilingConvention::from_profile(profile)
        }
    };

    let projection = convention.projection;
    let tiling_rectangle = projection.projected_extent();

    let coverage_rectangle = match options.coverage_rectangle {
        Some(rectangle) => rectangle,
        None => {
            let bounding_box = root.find("BoundingBox");
            let west = attr_f64(bounding_box, "minx");
            let south = attr_f64(bounding_box, "miny");
            let east = attr_f64(bounding_box, "maxx");
            let north = attr_f64(bounding_box, "maxy");

            match (west, south, east, north) {
                (Some(west), Some(south), Some(east), Some(north)) => {
                    if convention.bounding_box_in_degrees {
                        projection.project_rectangle(&GlobeRectangle::from_degrees(
                            west, south, east, north,
                        ))
                    } else {
                        Rectangle::new(west, south, east, north)
                    }
                }
                // A partial bounding box narrows nothing.
                _ => tiling_rectangle,
            }
        }
    };

    let tiling_scheme = QuadtreeTilingScheme::new(tiling_rectangle, convention.root_tiles_x, 1);

    debug!(
        %base_url,
        ?projection,
        minimum_level,
        maximum_level,
        extension = file_extension,
        "resolved TMS capabilities"
    );

    Ok(ResolvedConfiguration {
        projection,
        tiling_scheme,
        coverage_rectangle,
        tile_width,
        tile_height,
        minimum_level,
        maximum_level,
        file_extension: dot_prefixed(file_extension),
        base_url: base_url.clone(),
        headers: headers.to_vec(),
        credit: options.credit.clone(),
    })
}

/// Normalizes a file extension so URL construction is pure concatenation:
/// empty stays empty, anything else gains a leading dot if missing.
fn dot_prefixed(extension: String) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension
    } else {
        format!(".{}", extension)
    }
}
