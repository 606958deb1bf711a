// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Polygon geometry used by the evaluation pipeline.
//!
//! The pipeline only needs four operations from a region shape: its area,
//! its intersection with another shape, its bounding box and a translation.
//! These are captured by the [`Geometry`] trait so the matching code does not
//! depend on a particular polygon library. [`Shape`] is the implementation
//! used by the input drivers, backed by `geo` multi-polygons.
//!
//! Self-intersection is checked once, when a [`Shape`] is built from raw
//! contours. Shapes that reach the pipeline are therefore always simple.

use crate::Error;
use geo::{
    Area, BooleanOps, BoundingRect, Coord, Line, LineString, MultiPolygon, Polygon, Rect,
    Translate,
    algorithm::line_intersection::{LineIntersection, line_intersection},
};
use std::fmt;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns true if the box has no surface.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Returns true if both boxes share a region of positive area.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            x_min: rect.min().x,
            y_min: rect.min().y,
            x_max: rect.max().x,
            y_max: rect.max().y,
        }
    }
}

/// Minimal geometry capability required by the evaluation pipeline.
pub trait Geometry: Sized {
    /// Non-negative surface of the shape.
    fn area(&self) -> f64;

    /// Intersection with another shape, possibly empty.
    fn intersection(&self, other: &Self) -> Self;

    /// Area of the intersection with another shape.
    fn intersection_area(&self, other: &Self) -> f64 {
        self.intersection(other).area()
    }

    /// Bounding box, `None` for an empty shape.
    fn bounding_box(&self) -> Option<BoundingBox>;

    /// Copy of the shape shifted by `(dx, dy)`.
    fn translate(&self, dx: f64, dy: f64) -> Self;
}

/// A simple (non self-intersecting) polygonal region, possibly made of
/// several contours.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    polygons: MultiPolygon<f64>,
}

impl Shape {
    /// Shape with no contour and zero area.
    pub fn empty() -> Self {
        Self {
            polygons: MultiPolygon::new(vec![]),
        }
    }

    /// Axis-aligned rectangle with top-left corner `(x, y)`.
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Self {
        let rect = Rect::new(Coord { x, y }, Coord { x: x + w, y: y + h });
        Self {
            polygons: MultiPolygon::new(vec![rect.to_polygon()]),
        }
    }

    /// Build a shape from a single contour.
    ///
    /// Returns [`Error::SelfIntersectingPolygon`] if the contour crosses
    /// itself.
    pub fn from_contour<I>(points: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::from_contours([points])
    }

    /// Build a shape from several contours.
    ///
    /// Each contour is an outer ring given without (or with) its closing
    /// point. Consecutive duplicate points are dropped. Contours are merged
    /// so overlapping parts are counted once. Contours with less than three
    /// distinct points are kept as zero-area geometry.
    pub fn from_contours<I, C>(contours: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = (f64, f64)>,
    {
        let mut polygons = Vec::new();
        for contour in contours {
            let points = normalize_ring(contour.into_iter().map(Coord::from).collect());
            if !is_simple_contour(&points) {
                return Err(Error::SelfIntersectingPolygon(describe_ring(&points)));
            }
            polygons.push(Polygon::new(LineString::from(points), vec![]));
        }

        if polygons.len() <= 1 {
            return Ok(Self {
                polygons: MultiPolygon::new(polygons),
            });
        }

        // Degenerate contours have no surface to merge.
        let mut solid = polygons
            .into_iter()
            .filter(|polygon| polygon.unsigned_area() > 0.0);
        let merged = match solid.next() {
            Some(first) => solid.fold(MultiPolygon::new(vec![first]), |acc, polygon| {
                acc.union(&MultiPolygon::new(vec![polygon]))
            }),
            None => MultiPolygon::new(vec![]),
        };
        Ok(Self { polygons: merged })
    }

    /// Underlying `geo` representation.
    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    /// Outer rings, without their closing point.
    pub fn contours(&self) -> Vec<Vec<(f64, f64)>> {
        self.polygons
            .iter()
            .map(|polygon| open_ring(polygon.exterior()))
            .collect()
    }

    /// Inner rings (holes), without their closing point.
    pub fn holes(&self) -> Vec<Vec<(f64, f64)>> {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.interiors().iter().map(open_ring))
            .collect()
    }

    /// Returns the shape as a rectangle if it is a single axis-aligned one.
    fn as_rect(&self) -> Option<Rect<f64>> {
        let [polygon] = self.polygons.0.as_slice() else {
            return None;
        };
        if !polygon.interiors().is_empty() || polygon.exterior().0.len() != 5 {
            return None;
        }
        let rect = polygon.bounding_rect()?;
        let rect_area = rect.width() * rect.height();
        let is_rect = (rect_area - polygon.unsigned_area()).abs() <= rect_area * 1e-12;
        is_rect.then_some(rect)
    }
}

impl Geometry for Shape {
    fn area(&self) -> f64 {
        self.polygons.unsigned_area()
    }

    fn intersection(&self, other: &Self) -> Self {
        let (Some(a), Some(b)) = (self.bounding_box(), other.bounding_box()) else {
            return Shape::empty();
        };
        if !a.overlaps(&b) || self.area() == 0.0 || other.area() == 0.0 {
            return Shape::empty();
        }

        if let (Some(ra), Some(rb)) = (self.as_rect(), other.as_rect()) {
            let x_min = ra.min().x.max(rb.min().x);
            let y_min = ra.min().y.max(rb.min().y);
            let x_max = ra.max().x.min(rb.max().x);
            let y_max = ra.max().y.min(rb.max().y);
            return Shape::rectangle(x_min, y_min, x_max - x_min, y_max - y_min);
        }

        Shape {
            polygons: self.polygons.intersection(&other.polygons),
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygons.bounding_rect().map(BoundingBox::from)
    }

    fn translate(&self, dx: f64, dy: f64) -> Self {
        Shape {
            polygons: self.polygons.translate(dx, dy),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contours = self.contours();
        write!(f, "Shape[")?;
        for (index, contour) in contours.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", describe_points(contour))?;
        }
        write!(f, "]")
    }
}

/// Returns true if no two edges of the closed ring through `points` cross or
/// overlap, except neighbouring edges meeting at their shared vertex.
///
/// The ring may be given with or without its closing point. Rings with less
/// than three distinct points are considered simple.
pub fn is_simple_contour(points: &[Coord<f64>]) -> bool {
    let ring = normalize_ring(points.to_vec());
    let n = ring.len();
    if n < 3 {
        return true;
    }

    let edge = |k: usize| Line::new(ring[k], ring[(k + 1) % n]);
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edge(i), edge(j)) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return false,
                Some(LineIntersection::SinglePoint { .. }) if !adjacent => return false,
                Some(LineIntersection::SinglePoint { .. }) => {}
            }
        }
    }
    true
}

fn normalize_ring(mut points: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn open_ring(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = ring.coords().map(|c| (c.x, c.y)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn describe_ring(points: &[Coord<f64>]) -> String {
    let points: Vec<(f64, f64)> = points.iter().map(|c| (c.x, c.y)).collect();
    describe_points(&points)
}

fn describe_points(points: &[(f64, f64)]) -> String {
    let shown: Vec<String> = points
        .iter()
        .take(8)
        .map(|(x, y)| format!("({}, {})", x, y))
        .collect();
    if points.len() > 8 {
        format!("[{}, ... {} more]", shown.join(", "), points.len() - 8)
    } else {
        format!("[{}]", shown.join(", "))
    }
}
