//! Default lead engine: straight or quarter-arc leads on the waste side.

use async_trait::async_trait;
use kerfkit_core::constants::{DEFAULT_TESSELLATION_TOLERANCE, EPSILON};
use kerfkit_core::{GeometryError, LeadConfig, LeadType, Point};
use std::f64::consts::FRAC_PI_2;

use super::{LeadEngine, LeadRequest, LeadResult};
use crate::cut::{LeadGeometry, NormalSide};
use crate::error::{CamError, CamResult};

const ARC_LEAD_SEGMENTS: usize = 8;

/// Builds line and arc leads tangent-aware at the cut start and end.
#[derive(Debug, Clone)]
pub struct ArcLineLeadEngine {
    tolerance: f64,
}

impl Default for ArcLineLeadEngine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TESSELLATION_TOLERANCE,
        }
    }
}

impl ArcLineLeadEngine {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Lead length after fitting it to the cut.
    fn fitted_length(
        &self,
        config: &LeadConfig,
        cut_length: f64,
        label: &str,
        warnings: &mut Vec<String>,
    ) -> f64 {
        let limit = cut_length / 2.0;
        if config.length <= limit {
            return config.length;
        }
        if config.fit {
            warnings.push(format!(
                "{label} shortened from {:.3} to {:.3} to fit the cut",
                config.length, limit
            ));
            limit
        } else {
            warnings.push(format!(
                "{label} length {:.3} exceeds half the cut length {:.3}",
                config.length, limit
            ));
            config.length
        }
    }
}

/// Lead ending at `anchor`, approaching along `tangent` from the `normal` side.
fn lead_in_points(config: &LeadConfig, length: f64, anchor: Point, tangent: Point, normal: Point) -> Vec<Point> {
    match config.lead_type {
        LeadType::None => Vec::new(),
        LeadType::Line => {
            let angle = config.angle.to_radians();
            let direction = normal * angle.cos() - tangent * angle.sin();
            vec![anchor + direction * length, anchor]
        }
        LeadType::Arc => {
            let center = anchor + normal * length;
            (0..=ARC_LEAD_SEGMENTS)
                .map(|i| {
                    let phi = FRAC_PI_2 * i as f64 / ARC_LEAD_SEGMENTS as f64;
                    center + (tangent * -phi.cos() - normal * phi.sin()) * length
                })
                .collect()
        }
    }
}

/// Lead starting at `anchor`, leaving along `tangent` toward the `normal` side.
fn lead_out_points(config: &LeadConfig, length: f64, anchor: Point, tangent: Point, normal: Point) -> Vec<Point> {
    match config.lead_type {
        LeadType::None => Vec::new(),
        LeadType::Line => {
            let angle = config.angle.to_radians();
            let direction = normal * angle.cos() + tangent * angle.sin();
            vec![anchor, anchor + direction * length]
        }
        LeadType::Arc => {
            let center = anchor + normal * length;
            (0..=ARC_LEAD_SEGMENTS)
                .map(|i| {
                    let phi = FRAC_PI_2 * i as f64 / ARC_LEAD_SEGMENTS as f64;
                    center + (normal * -phi.cos() + tangent * phi.sin()) * length
                })
                .collect()
        }
    }
}

#[async_trait]
impl LeadEngine for ArcLineLeadEngine {
    async fn calculate_leads(&self, request: LeadRequest) -> CamResult<LeadResult> {
        let chain = &request.chain;
        let (Some(first), Some(last)) = (chain.shapes.first(), chain.shapes.last()) else {
            return Err(GeometryError::EmptyChain {
                chain_id: chain.id.clone(),
            }
            .into());
        };

        let start = first.start_point();
        let start_tangent = first.tangent_at(0.0);
        let end = last.end_point();
        let end_tangent = last.tangent_at(1.0);
        if start_tangent.length() < EPSILON || end_tangent.length() < EPSILON {
            return Err(CamError::LeadEngine(format!(
                "Chain {} has a degenerate start or end",
                chain.id
            )));
        }

        let side = request
            .normal
            .map(|n| n.side)
            .unwrap_or(NormalSide::Left);
        let side_normal = |tangent: Point| match side {
            NormalSide::Left => tangent.left_perpendicular().normalized(),
            NormalSide::Right => tangent.right_perpendicular().normalized(),
        };
        let start_normal = request
            .normal
            .map(|n| n.normal)
            .unwrap_or_else(|| side_normal(start_tangent));
        let end_normal = side_normal(end_tangent);

        let cut_length = chain.length();
        let mut result = LeadResult::default();

        if !request.lead_in.is_none() {
            let length =
                self.fitted_length(&request.lead_in, cut_length, "Lead-in", &mut result.warnings);
            let points = lead_in_points(&request.lead_in, length, start, start_tangent, start_normal);

            let source_id = chain.original_chain_id.as_deref().unwrap_or(&chain.id);
            let in_hole = request
                .part
                .as_ref()
                .is_some_and(|part| part.is_hole_chain(source_id));
            if let Some(lead_start) = points.first() {
                if in_hole && !chain.contains_point(lead_start, self.tolerance) {
                    result
                        .warnings
                        .push("Lead-in for hole starts outside the hole boundary".to_string());
                }
            }
            result.lead_in = Some(LeadGeometry {
                kind: request.lead_in.lead_type,
                points,
            });
        }

        if !request.lead_out.is_none() {
            let length =
                self.fitted_length(&request.lead_out, cut_length, "Lead-out", &mut result.warnings);
            result.lead_out = Some(LeadGeometry {
                kind: request.lead_out.lead_type,
                points: lead_out_points(&request.lead_out, length, end, end_tangent, end_normal),
            });
        }

        Ok(result)
    }
}
