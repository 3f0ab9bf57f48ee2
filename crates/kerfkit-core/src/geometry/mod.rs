//! Geometry primitives for drawing boundaries.
//!
//! Every shape kind lives in its own module and implements [`Segment`];
//! [`Geometry`] is the closed variant over all kinds and dispatches with
//! exhaustive matches.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::constants::{EPSILON, MAX_TESSELLATION_SEGMENTS};

mod arc;
mod chain;
mod circle;
mod ellipse;
mod line;
mod part;
mod polyline;
mod shape;
mod spline;

pub use arc::Arc;
pub use chain::{clone_shapes, Chain};
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line::Line;
pub use part::{Part, PartHole, PartSlot};
pub use polyline::Polyline;
pub use shape::{Geometry, Shape};
pub use spline::Spline;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 2D cross product.
    pub fn cross(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(&self) -> Point {
        let len = self.length();
        if len < EPSILON {
            Point::default()
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }

    /// Vector rotated 90 degrees counterclockwise.
    pub fn left_perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Vector rotated 90 degrees clockwise.
    pub fn right_perpendicular(&self) -> Point {
        Point::new(self.y, -self.x)
    }

    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn rotated(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
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

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = BoundingBox::new(*first, *first);
        for p in &points[1..] {
            bb.include(p);
        }
        Some(bb)
    }

    pub fn include(&mut self, p: &Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bb = *self;
        bb.include(&other.min);
        bb.include(&other.max);
        bb
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.lerp(&self.max, 0.5)
    }
}

/// Operations every shape payload supports.
///
/// Parameters `t` are normalized to `[0, 1]` from start to end of the shape
/// in its stored traversal direction.
pub trait Segment {
    fn start_point(&self) -> Point;
    fn end_point(&self) -> Point;
    fn point_at(&self, t: f64) -> Point;
    fn length(&self) -> f64;

    /// Same geometry traversed the other way; start and end swap.
    fn reversed(&self) -> Self
    where
        Self: Sized;

    /// Splits at `t` into two pieces that share the split point.
    fn split_at(&self, t: f64) -> (Geometry, Geometry);

    /// Points along the shape, first and last included, with chord error
    /// at most `tolerance` where the kind allows it.
    fn tessellate(&self, tolerance: f64) -> Vec<Point>;

    /// Unit tangent in the direction of travel.
    fn tangent_at(&self, t: f64) -> Point {
        let h = 1e-4;
        let a = self.point_at((t - h).max(0.0));
        let b = self.point_at((t + h).min(1.0));
        (b - a).normalized()
    }

    fn bounds(&self) -> BoundingBox {
        let points = self.tessellate(self.length().max(EPSILON) * 1e-3);
        BoundingBox::from_points(&points)
            .unwrap_or_else(|| BoundingBox::new(self.start_point(), self.start_point()))
    }
}

/// Normalizes a sweep to `(0, 2π]`; a zero sweep means a full turn.
pub(crate) fn normalize_sweep(sweep: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let s = sweep.rem_euclid(tau);
    if s <= EPSILON {
        tau
    } else {
        s
    }
}

/// Number of chords needed to keep the sagitta of a circular sweep under
/// `tolerance`.
pub(crate) fn arc_segment_count(radius: f64, sweep: f64, tolerance: f64) -> usize {
    if radius <= EPSILON {
        return 1;
    }
    let tol = tolerance.max(EPSILON);
    let max_step = if tol >= radius {
        std::f64::consts::FRAC_PI_2
    } else {
        2.0 * (1.0 - tol / radius).acos()
    };
    let n = (sweep.abs() / max_step.max(1e-6)).ceil() as usize;
    n.clamp(1, MAX_TESSELLATION_SEGMENTS)
}
