//! Map projections for tile math.
//!
//! Converts between geodetic longitude/latitude degrees and the planar
//! coordinates a tiling scheme subdivides. Two projections cover every TMS
//! profile in the wild:
//!
//! - [`Projection::WebMercator`] (EPSG:3857), planar units in meters.
//! - [`Projection::Geographic`] (EPSG:4326, equirectangular), planar units
//!   in degrees so projection is the identity transform.
//!
//! Both transforms are pure and total: Web Mercator clamps out-of-domain
//! latitudes to its valid range instead of failing.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::{GlobeRectangle, Rectangle};

/// Radius of the WGS84 ellipsoid's semi-major axis in meters, the sphere
/// radius used by the Web Mercator projection.
const WGS84_SEMI_MAJOR_AXIS: f64 = 6378137.0;

/// Maximum latitude representable in Web Mercator, in degrees.
///
/// The latitude at which the projected extent becomes square:
/// `atan(sinh(pi))` expressed in degrees.
pub const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.05112877980659;

/// A transform between geodetic degrees and projected planar coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    /// Spherical Web Mercator (EPSG:3857).
    WebMercator,
    /// Equirectangular plate carrée (EPSG:4326); degrees pass through.
    Geographic,
}

impl Projection {
    /// The full geodetic rectangle this projection can represent.
    pub fn maximum_extent(&self) -> GlobeRectangle {
        match self {
            Projection::WebMercator => GlobeRectangle::from_degrees(
                -180.0,
                -WEB_MERCATOR_MAX_LATITUDE,
                180.0,
                WEB_MERCATOR_MAX_LATITUDE,
            ),
            Projection::Geographic => GlobeRectangle::from_degrees(-180.0, -90.0, 180.0, 90.0),
        }
    }

    /// The projected form of [`Projection::maximum_extent`].
    pub fn projected_extent(&self) -> Rectangle {
        self.project_rectangle(&self.maximum_extent())
    }

    /// Projects a geodetic rectangle into planar coordinates.
    pub fn project_rectangle(&self, rectangle: &GlobeRectangle) -> Rectangle {
        let (west, south) = self.project(rectangle.west, rectangle.south);
        let (east, north) = self.project(rectangle.east, rectangle.north);
        Rectangle::new(west, south, east, north)
    }

    /// Unprojects a planar rectangle back into geodetic degrees.
    pub fn unproject_rectangle(&self, rectangle: &Rectangle) -> GlobeRectangle {
        let (west, south) = self.unproject(rectangle.west, rectangle.south);
        let (east, north) = self.unproject(rectangle.east, rectangle.north);
        GlobeRectangle::from_degrees(west, south, east, north)
    }

    /// Projects one geodetic point (degrees) to planar coordinates.
    ///
    /// Web Mercator clamps latitude to [`WEB_MERCATOR_MAX_LATITUDE`].
    pub fn project(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        match self {
            Projection::WebMercator => {
                let latitude = latitude.clamp(-WEB_MERCATOR_MAX_LATITUDE, WEB_MERCATOR_MAX_LATITUDE);
                let x = longitude.to_radians() * WGS84_SEMI_MAJOR_AXIS;
                let lat_rad = latitude.to_radians();
                let y = ((PI / 4.0 + lat_rad / 2.0).tan()).ln() * WGS84_SEMI_MAJOR_AXIS;
                (x, y)
            }
            Projection::Geographic => (longitude, latitude),
        }
    }

    /// Unprojects one planar point back to geodetic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::WebMercator => {
                let longitude = (x / WGS84_SEMI_MAJOR_AXIS).to_degrees();
                let latitude =
                    (2.0 * (y / WGS84_SEMI_MAJOR_AXIS).exp().atan() - PI / 2.0).to_degrees();
                (longitude, latitude)
            }
            Projection::Geographic => (x, y),
        }
    }
}
