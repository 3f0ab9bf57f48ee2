//! Cut normal calculation.
//!
//! The normal at the start of a cut points to the waste side of the path:
//! outside for shells and standalone profiles, inside for holes, slots and
//! inset cuts. Lead engines place leads on that side.

use kerfkit_core::constants::{DEFAULT_TESSELLATION_TOLERANCE, EPSILON};
use kerfkit_core::{Chain, CutDirection, Part};

use crate::cut::{CutNormal, NormalSide};
use crate::offset::OffsetDirection;

/// Computes the orientation of a cut from its execution chain.
pub trait NormalEngine: Send + Sync {
    fn compute_cut_normal(
        &self,
        cut_chain: &Chain,
        cut_direction: CutDirection,
        part: Option<&Part>,
        offset_direction: OffsetDirection,
    ) -> Option<CutNormal>;
}

/// Normal toward the waste side, taken at the first shape's start.
#[derive(Debug, Clone)]
pub struct WasteSideNormalEngine {
    tolerance: f64,
}

impl Default for WasteSideNormalEngine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TESSELLATION_TOLERANCE,
        }
    }
}

impl WasteSideNormalEngine {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn waste_is_inside(
        &self,
        cut_chain: &Chain,
        part: Option<&Part>,
        offset_direction: OffsetDirection,
    ) -> bool {
        let source_id = cut_chain
            .original_chain_id
            .as_deref()
            .unwrap_or(&cut_chain.id);
        let inner_member =
            part.is_some_and(|p| p.is_hole_chain(source_id) || p.is_slot_chain(source_id));
        inner_member || offset_direction == OffsetDirection::Inset
    }
}

impl NormalEngine for WasteSideNormalEngine {
    fn compute_cut_normal(
        &self,
        cut_chain: &Chain,
        cut_direction: CutDirection,
        part: Option<&Part>,
        offset_direction: OffsetDirection,
    ) -> Option<CutNormal> {
        let first = cut_chain.shapes.first()?;
        let connection_point = first.start_point();
        let tangent = first.tangent_at(0.0);
        if tangent.length() < EPSILON {
            return None;
        }
        let left = tangent.left_perpendicular().normalized();

        let side = if cut_chain.is_closed(self.tolerance) {
            let clockwise = cut_chain
                .realized_clockwise(self.tolerance)
                .or(cut_direction.as_clockwise())
                .unwrap_or(false);
            // Counterclockwise travel keeps the interior on the left
            let inside = if clockwise {
                NormalSide::Right
            } else {
                NormalSide::Left
            };
            if self.waste_is_inside(cut_chain, part, offset_direction) {
                inside
            } else {
                match inside {
                    NormalSide::Left => NormalSide::Right,
                    NormalSide::Right => NormalSide::Left,
                }
            }
        } else {
            NormalSide::Left
        };

        let normal = match side {
            NormalSide::Left => left,
            NormalSide::Right => -left,
        };
        Some(CutNormal {
            normal,
            connection_point,
            side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerfkit_core::{PartHole, Point, Shape};

    fn ccw_square(id: &str, origin: Point, size: f64) -> Chain {
        let p = [
            origin,
            origin + Point::new(size, 0.0),
            origin + Point::new(size, size),
            origin + Point::new(0.0, size),
        ];
        let shapes = (0..4)
            .map(|i| Shape::line(format!("{id}-{i}"), p[i], p[(i + 1) % 4]))
            .collect();
        Chain::new(id, shapes).with_winding(Some(false))
    }

    #[test]
    fn test_shell_normal_points_outside() {
        let engine = WasteSideNormalEngine::default();
        let chain = ccw_square("shell", Point::new(0.0, 0.0), 10.0);
        let normal = engine
            .compute_cut_normal(&chain, CutDirection::Counterclockwise, None, OffsetDirection::Outset)
            .unwrap();
        // Bottom edge travelling +X: outside is -Y
        assert_eq!(normal.side, NormalSide::Right);
        assert!((normal.normal.y + 1.0).abs() < 1e-12);
        assert_eq!(normal.connection_point, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_hole_normal_points_inside() {
        let engine = WasteSideNormalEngine::default();
        let hole = ccw_square("hole", Point::new(2.0, 2.0), 2.0);
        let part = Part::new("p", ccw_square("shell", Point::new(0.0, 0.0), 10.0))
            .with_holes(vec![PartHole::new("h", hole.clone())]);
        let normal = engine
            .compute_cut_normal(&hole, CutDirection::None, Some(&part), OffsetDirection::None)
            .unwrap();
        assert_eq!(normal.side, NormalSide::Left);
        assert!((normal.normal.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_chain_uses_left() {
        let engine = WasteSideNormalEngine::default();
        let chain = Chain::new(
            "path",
            vec![Shape::line("l", Point::new(0.0, 0.0), Point::new(0.0, 5.0))],
        );
        let normal = engine
            .compute_cut_normal(&chain, CutDirection::Clockwise, None, OffsetDirection::None)
            .unwrap();
        assert_eq!(normal.side, NormalSide::Left);
        assert!((normal.normal.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_chain_has_no_normal() {
        let engine = WasteSideNormalEngine::default();
        let chain = Chain::new("empty", vec![]);
        assert!(engine
            .compute_cut_normal(&chain, CutDirection::None, None, OffsetDirection::None)
            .is_none());
    }
}
