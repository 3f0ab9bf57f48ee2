use serde::{Deserialize, Serialize};

use super::{arc_segment_count, normalize_sweep, Geometry, Point, Segment};

/// Circular arc. Angles are in radians, measured counterclockwise from +X.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(default)]
    pub clockwise: bool,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, end_angle: f64, clockwise: bool) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        }
    }

    /// Unsigned angular extent in `(0, 2π]`.
    pub fn sweep(&self) -> f64 {
        if self.clockwise {
            normalize_sweep(self.start_angle - self.end_angle)
        } else {
            normalize_sweep(self.end_angle - self.start_angle)
        }
    }

    pub fn angle_at(&self, t: f64) -> f64 {
        let delta = self.sweep() * t.clamp(0.0, 1.0);
        if self.clockwise {
            self.start_angle - delta
        } else {
            self.start_angle + delta
        }
    }

    fn point_at_angle(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(
            self.center.x + self.radius * cos,
            self.center.y + self.radius * sin,
        )
    }
}

impl Segment for Arc {
    fn start_point(&self) -> Point {
        self.point_at_angle(self.start_angle)
    }

    fn end_point(&self) -> Point {
        self.point_at_angle(self.end_angle)
    }

    fn point_at(&self, t: f64) -> Point {
        self.point_at_angle(self.angle_at(t))
    }

    fn length(&self) -> f64 {
        self.radius * self.sweep()
    }

    fn reversed(&self) -> Self {
        Arc::new(
            self.center,
            self.radius,
            self.end_angle,
            self.start_angle,
            !self.clockwise,
        )
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let mid = self.angle_at(t);
        (
            Geometry::Arc(Arc::new(self.center, self.radius, self.start_angle, mid, self.clockwise)),
            Geometry::Arc(Arc::new(self.center, self.radius, mid, self.end_angle, self.clockwise)),
        )
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        let n = arc_segment_count(self.radius, self.sweep(), tolerance);
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
}
