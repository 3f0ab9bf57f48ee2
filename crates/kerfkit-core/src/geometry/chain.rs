//! Chains: ordered runs of connected shapes forming one boundary or path.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point, Shape};
use crate::constants::EPSILON;
use crate::error::GeometryError;

/// Ordered sequence of connected shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: String,
    pub shapes: Vec<Shape>,
    /// Natural winding: `Some(true)` clockwise, `Some(false)` counterclockwise,
    /// `None` for open or indeterminate chains.
    #[serde(default)]
    pub clockwise: Option<bool>,
    /// Source chain when this chain was derived from another one.
    #[serde(default)]
    pub original_chain_id: Option<String>,
}

/// Deep copy of a shape list.
///
/// Every ownership transfer of chain geometry (execution chains, offset
/// records, lead sources) goes through this routine so the receiver owns
/// its data outright.
pub fn clone_shapes(shapes: &[Shape]) -> Vec<Shape> {
    shapes.to_vec()
}

impl Chain {
    pub fn new(id: impl Into<String>, shapes: Vec<Shape>) -> Self {
        Self {
            id: id.into(),
            shapes,
            clockwise: None,
            original_chain_id: None,
        }
    }

    pub fn with_winding(mut self, clockwise: Option<bool>) -> Self {
        self.clockwise = clockwise;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Fails when there is nothing to machine.
    pub fn ensure_not_empty(&self) -> Result<(), GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::EmptyChain {
                chain_id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn start_point(&self) -> Option<Point> {
        self.shapes.first().map(Shape::start_point)
    }

    pub fn end_point(&self) -> Option<Point> {
        self.shapes.last().map(Shape::end_point)
    }

    /// Whether the last shape ends where the first one starts.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => start.approx_eq(&end, tolerance),
            _ => false,
        }
    }

    pub fn length(&self) -> f64 {
        self.shapes.iter().map(Shape::length).sum()
    }

    /// Points along the whole chain with consecutive duplicates removed.
    pub fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for shape in &self.shapes {
            for p in shape.tessellate(tolerance) {
                match points.last() {
                    Some(last) if last.approx_eq(&p, EPSILON) => {}
                    _ => points.push(p),
                }
            }
        }
        points
    }

    /// Shoelace area of the tessellated chain; positive for counterclockwise.
    pub fn signed_area(&self, tolerance: f64) -> f64 {
        let points = self.tessellate(tolerance);
        if points.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            sum += a.cross(&b);
        }
        sum / 2.0
    }

    /// Winding of the geometry as stored, independent of the `clockwise` flag.
    pub fn realized_clockwise(&self, tolerance: f64) -> Option<bool> {
        if !self.is_closed(tolerance) {
            return None;
        }
        let area = self.signed_area(tolerance);
        if area.abs() < EPSILON {
            None
        } else {
            Some(area < 0.0)
        }
    }

    /// Same path traversed the other way.
    pub fn reversed(&self) -> Chain {
        Chain {
            shapes: self.shapes.iter().rev().map(Shape::reversed).collect(),
            clockwise: self.clockwise.map(|cw| !cw),
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Even-odd point containment against the tessellated boundary.
    pub fn contains_point(&self, p: &Point, tolerance: f64) -> bool {
        let points = self.tessellate(tolerance);
        if points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = points.len() - 1;
        for i in 0..points.len() {
            let (a, b) = (points[i], points[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
