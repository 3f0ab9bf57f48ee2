use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::{arc_segment_count, Arc, BoundingBox, Geometry, Point, Segment};

/// Full circle starting and ending at angle 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    #[serde(default)]
    pub clockwise: bool,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            clockwise: false,
        }
    }

    fn angle_at(&self, t: f64) -> f64 {
        let delta = TAU * t.clamp(0.0, 1.0);
        if self.clockwise {
            -delta
        } else {
            delta
        }
    }
}

impl Segment for Circle {
    fn start_point(&self) -> Point {
        Point::new(self.center.x + self.radius, self.center.y)
    }

    fn end_point(&self) -> Point {
        self.start_point()
    }

    fn point_at(&self, t: f64) -> Point {
        let (sin, cos) = self.angle_at(t).sin_cos();
        Point::new(
            self.center.x + self.radius * cos,
            self.center.y + self.radius * sin,
        )
    }

    fn length(&self) -> f64 {
        TAU * self.radius
    }

    fn reversed(&self) -> Self {
        Circle {
            clockwise: !self.clockwise,
            ..self.clone()
        }
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let mid = self.angle_at(t);
        (
            Geometry::Arc(Arc::new(self.center, self.radius, 0.0, mid, self.clockwise)),
            Geometry::Arc(Arc::new(self.center, self.radius, mid, 0.0, self.clockwise)),
        )
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        let n = arc_segment_count(self.radius, TAU, tolerance).max(4);
        (0..=n)
            .map(|i| self.point_at(i as f64 / n as f64))
            .collect()
    }

    fn tangent_at(&self, t: f64) -> Point {
        let (sin, cos) = self.angle_at(t).sin_cos();
        if self.clockwise {
            Point::new(sin, -cos)
        } else {
            Point::new(-sin, cos)
        }
    }

    fn bounds(&self) -> BoundingBox {
        let r = Point::new(self.radius, self.radius);
        BoundingBox::new(self.center - r, self.center + r)
    }
}
