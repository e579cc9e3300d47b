//! Screen-space geometry: points, sizes, rectangles, and the polygon test
//! used by the lasso.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point (or displacement) in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when used as a vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    #[must_use]
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.origin.x + self.size.width / 2.0, self.origin.y + self.size.height / 2.0)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.origin.x && pt.x <= self.right() && pt.y >= self.origin.y && pt.y <= self.bottom()
    }

    /// The eight boundary samples tested by the lasso: four corners, then the
    /// four edge midpoints.
    #[must_use]
    pub fn sample_points(&self) -> [Point; 8] {
        let (l, t, r, b) = (self.origin.x, self.origin.y, self.right(), self.bottom());
        let c = self.center();
        [
            Point::new(l, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
            Point::new(c.x, t),
            Point::new(r, c.y),
            Point::new(c.x, b),
            Point::new(l, c.y),
        ]
    }
}

/// Ray-crossing point-in-polygon test. The polygon is implicitly closed;
/// fewer than three vertices never contain anything.
#[must_use]
pub fn point_in_polygon(pt: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > pt.y) != (b.y > pt.y) {
            let cross_x = (b.x - a.x) * (pt.y - a.y) / (b.y - a.y) + a.x;
            if pt.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Clamp `pt` so a box of `footprint` stays inside `viewport`. When the box is
/// larger than the viewport the top-left edge wins.
#[must_use]
pub fn clamp_to_viewport(pt: Point, footprint: Size, viewport: Size) -> Point {
    let max_x = (viewport.width - footprint.width).max(0.0);
    let max_y = (viewport.height - footprint.height).max(0.0);
    Point::new(pt.x.clamp(0.0, max_x), pt.y.clamp(0.0, max_y))
}
