//! Rectangle value types.
//!
//! Two flavours are used throughout the crate:
//!
//! - [`Rectangle`] lives in projected (planar) coordinates, whatever linear
//!   units the active projection uses (meters for Web Mercator, degrees for
//!   the geographic projection).
//! - [`GlobeRectangle`] lives in geodetic longitude/latitude degrees.
//!
//! Both are plain `Copy` values; callers are responsible for keeping
//! `west < east` and `south < north`.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in projected planar coordinates.
///
/// Units are projection-specific: Web Mercator meters or geographic degrees.
/// Invariant (caller contract): `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    /// Creates a rectangle from its four edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Width of the rectangle in projection units.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the rectangle in projection units.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Returns true if `other` lies entirely within this rectangle,
    /// allowing `tolerance` of slack on every edge.
    pub fn contains(&self, other: &Rectangle, tolerance: f64) -> bool {
        other.west >= self.west - tolerance
            && other.east <= self.east + tolerance
            && other.south >= self.south - tolerance
            && other.north <= self.north + tolerance
    }

    /// Returns true if the two rectangles share any area.
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.west < other.east
            && other.west < self.east
            && self.south < other.north
            && other.south < self.north
    }

    /// Smallest rectangle containing both inputs.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }

    /// Intersection of two rectangles, or `None` when they are disjoint.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let west = self.west.max(other.west);
        let south = self.south.max(other.south);
        let east = self.east.min(other.east);
        let north = self.north.min(other.north);

        if west < east && south < north {
            Some(Rectangle::new(west, south, east, north))
        } else {
            None
        }
    }
}

/// A geodetic rectangle in longitude/latitude degrees.
///
/// Longitude spans [-180, 180], latitude [-90, 90]. The Web Mercator
/// projection further restricts the usable latitude range; see
/// [`crate::projection::Projection::maximum_extent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobeRectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GlobeRectangle {
    /// Creates a geodetic rectangle from degree values.
    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_and_height() {
        let rect = Rectangle::new(-10.0, -5.0, 30.0, 15.0);
        assert_eq!(rect.width(), 40.0);
        assert_eq!(rect.height(), 20.0);
    }

    #[test]
    fn test_contains_self() {
        let rect = Rectangle::new(-10.0, -5.0, 30.0, 15.0);
        assert!(rect.contains(&rect, 0.0));
    }

    #[test]
    fn test_contains_sub_rectangle() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rectangle::new(25.0, 25.0, 75.0, 75.0);
        assert!(outer.contains(&inner, 0.0));
        assert!(!inner.contains(&outer, 0.0));
    }

    #[test]
    fn test_contains_with_tolerance() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let nudged = Rectangle::new(-1e-12, 0.0, 100.0, 100.0);
        assert!(!outer.contains(&nudged, 0.0));
        assert!(outer.contains(&nudged, 1e-9));
    }

    #[test]
    fn test_overlaps() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 15.0, 15.0);
        let c = Rectangle::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(10.0, 0.0, 20.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_intersection() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 15.0, 15.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rectangle::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_union_spans_both() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, -5.0, 15.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u, Rectangle::new(0.0, -5.0, 15.0, 10.0));
        assert!(u.contains(&a, 0.0));
        assert!(u.contains(&b, 0.0));
    }

    #[test]
    fn test_union_of_disjoint_bridges_the_gap() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let c = Rectangle::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.union(&c), Rectangle::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let c = Rectangle::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_globe_rectangle_from_degrees() {
        let rect = GlobeRectangle::from_degrees(-100.0, 10.0, -90.0, 20.0);
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 10.0);
    }
}
