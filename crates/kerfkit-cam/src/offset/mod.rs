//! Kerf compensation.
//!
//! Maps a kerf-compensation mode and a member role to an offset direction,
//! asks the offset engine for the offset geometry and keeps the side that
//! matches the request. Every failure here degrades to "no offset".

mod cavalier;

pub use cavalier::CavalierOffsetEngine;

use async_trait::async_trait;
use chrono::Utc;
use kerfkit_core::{
    clone_shapes, Chain, KerfCompensation, MeasurementSystem, Shape, ToolId, ToolLibrary,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::OffsetParameters;
use crate::cut::{GapFill, MemberRole, OffsetRecord};

/// Side of the source chain the cut path moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetDirection {
    #[default]
    None,
    /// Toward the inside of the boundary
    Inset,
    /// Toward the outside of the boundary
    Outset,
}

impl OffsetDirection {
    /// Half the kerf width, negative for inset and positive for outset
    pub fn signed_distance(self, kerf_width: f64) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Inset => -kerf_width / 2.0,
            Self::Outset => kerf_width / 2.0,
        }
    }
}

impl fmt::Display for OffsetDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Inset => write!(f, "Inset"),
            Self::Outset => write!(f, "Outset"),
        }
    }
}

/// Offset direction for a kerf mode applied to a member role.
pub fn resolve_offset_direction(mode: KerfCompensation, role: MemberRole) -> OffsetDirection {
    match mode {
        KerfCompensation::None => OffsetDirection::None,
        KerfCompensation::Inner => OffsetDirection::Inset,
        KerfCompensation::Outer => OffsetDirection::Outset,
        KerfCompensation::Part => match role {
            MemberRole::Standalone | MemberRole::Slot => OffsetDirection::None,
            MemberRole::Shell => OffsetDirection::Outset,
            MemberRole::Hole => OffsetDirection::Inset,
        },
    }
}

/// One side of an engine result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetSide {
    pub shapes: Vec<Shape>,
    pub gap_fills: Vec<GapFill>,
}

/// Raw answer from an [`OffsetEngine`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainOffsetResult {
    pub success: bool,
    pub inner_chain: Option<OffsetSide>,
    pub outer_chain: Option<OffsetSide>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ChainOffsetResult {
    /// Failed result carrying a single error
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Default::default()
        }
    }
}

/// Numerical offset-curve engine.
///
/// Implementations offset `chain` by `|distance|` to both sides and report
/// which result lies inside and which outside the boundary.
#[async_trait]
pub trait OffsetEngine: Send + Sync {
    async fn offset_chain(
        &self,
        chain: &Chain,
        distance: f64,
        params: &OffsetParameters,
    ) -> ChainOffsetResult;
}

/// Why no offset was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetSkip {
    /// Kerf mode resolved to no offset for this member
    NoDirection,
    NoTool,
    ToolNotFound(ToolId),
    NoKerfWidth(ToolId),
    EngineFailed(String),
    EmptySide(OffsetDirection),
}

impl OffsetSkip {
    /// Whether the skip means a requested offset could not be honored
    pub fn is_degradation(&self) -> bool {
        !matches!(self, Self::NoDirection)
    }
}

impl fmt::Display for OffsetSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDirection => write!(f, "No offset requested"),
            Self::NoTool => write!(f, "Kerf compensation requested but no tool assigned"),
            Self::ToolNotFound(id) => write!(f, "Tool {id} not found; cutting without kerf offset"),
            Self::NoKerfWidth(id) => {
                write!(f, "Tool {id} has no usable kerf width; cutting without kerf offset")
            }
            Self::EngineFailed(reason) => write!(f, "Offset failed: {reason}"),
            Self::EmptySide(direction) => {
                write!(f, "Offset produced no {direction} geometry")
            }
        }
    }
}

/// Offset applied, or the reason it was not.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetOutcome {
    Applied(OffsetRecord),
    Skipped(OffsetSkip),
}

impl OffsetOutcome {
    pub fn applied(self) -> Option<OffsetRecord> {
        match self {
            Self::Applied(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }
}

/// Drives the offset engine for kerf compensation.
#[derive(Clone)]
pub struct OffsetOrchestrator {
    engine: Arc<dyn OffsetEngine>,
    params: OffsetParameters,
    measurement_system: MeasurementSystem,
}

impl OffsetOrchestrator {
    pub fn new(
        engine: Arc<dyn OffsetEngine>,
        params: OffsetParameters,
        measurement_system: MeasurementSystem,
    ) -> Self {
        Self {
            engine,
            params,
            measurement_system,
        }
    }

    /// Offset `chain` for kerf compensation, or `None` when no offset applies.
    pub async fn compute_offset(
        &self,
        chain: &Chain,
        direction: OffsetDirection,
        tool_id: Option<&ToolId>,
        tools: &ToolLibrary,
    ) -> Option<OffsetRecord> {
        self.compute_offset_outcome(chain, direction, tool_id, tools)
            .await
            .applied()
    }

    /// Same as [`compute_offset`](Self::compute_offset) but keeps the reason
    /// an offset was skipped.
    pub async fn compute_offset_outcome(
        &self,
        chain: &Chain,
        direction: OffsetDirection,
        tool_id: Option<&ToolId>,
        tools: &ToolLibrary,
    ) -> OffsetOutcome {
        let outcome = self.offset_inner(chain, direction, tool_id, tools).await;
        if let OffsetOutcome::Skipped(reason) = &outcome {
            if reason.is_degradation() {
                warn!("Chain {}: {}", chain.id, reason);
            } else {
                debug!("Chain {}: {}", chain.id, reason);
            }
        }
        outcome
    }

    async fn offset_inner(
        &self,
        chain: &Chain,
        direction: OffsetDirection,
        tool_id: Option<&ToolId>,
        tools: &ToolLibrary,
    ) -> OffsetOutcome {
        if direction == OffsetDirection::None {
            return OffsetOutcome::Skipped(OffsetSkip::NoDirection);
        }
        let Some(tool_id) = tool_id else {
            return OffsetOutcome::Skipped(OffsetSkip::NoTool);
        };
        let Some(tool) = tools.get_tool(tool_id) else {
            return OffsetOutcome::Skipped(OffsetSkip::ToolNotFound(tool_id.clone()));
        };
        let Some(kerf_width) = tool
            .kerf_width_for(self.measurement_system)
            .filter(|kerf| kerf.is_finite() && *kerf > 0.0)
        else {
            return OffsetOutcome::Skipped(OffsetSkip::NoKerfWidth(tool_id.clone()));
        };

        let distance = direction.signed_distance(kerf_width);
        debug!(
            "Offsetting chain {} by {:.4} ({})",
            chain.id, distance, direction
        );
        let result = self
            .engine
            .offset_chain(chain, distance, &self.params)
            .await;

        if !result.success {
            let reason = if result.errors.is_empty() {
                "engine reported failure".to_string()
            } else {
                result.errors.join("; ")
            };
            return OffsetOutcome::Skipped(OffsetSkip::EngineFailed(reason));
        }

        let side = match direction {
            OffsetDirection::Inset => result.inner_chain,
            OffsetDirection::Outset => result.outer_chain,
            OffsetDirection::None => None,
        };
        let Some(side) = side.filter(|side| !side.shapes.is_empty()) else {
            return OffsetOutcome::Skipped(OffsetSkip::EmptySide(direction));
        };

        OffsetOutcome::Applied(OffsetRecord {
            offset_shapes: side.shapes,
            original_shapes: clone_shapes(&chain.shapes),
            direction,
            kerf_width,
            gap_fills: side.gap_fills,
            warnings: result.warnings,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerfkit_core::{MeasuredValue, Point, Tool};

    /// Engine that echoes the chain shifted by the distance on both sides.
    struct ShiftEngine {
        success: bool,
    }

    #[async_trait]
    impl OffsetEngine for ShiftEngine {
        async fn offset_chain(
            &self,
            chain: &Chain,
            distance: f64,
            _params: &OffsetParameters,
        ) -> ChainOffsetResult {
            if !self.success {
                return ChainOffsetResult::failure("self-intersecting input");
            }
            let shift = |d: f64| OffsetSide {
                shapes: vec![Shape::line(
                    format!("{}-shifted", chain.id),
                    Point::new(0.0, d),
                    Point::new(1.0, d),
                )],
                gap_fills: Vec::new(),
            };
            ChainOffsetResult {
                success: true,
                inner_chain: Some(shift(-distance.abs())),
                outer_chain: Some(shift(distance.abs())),
                warnings: vec!["note".to_string()],
                errors: Vec::new(),
            }
        }
    }

    fn chain() -> Chain {
        Chain::new(
            "c1",
            vec![Shape::line("l1", Point::new(0.0, 0.0), Point::new(1.0, 0.0))],
        )
    }

    fn tools() -> ToolLibrary {
        ToolLibrary::from_tools([Tool::new(ToolId::from("torch"), 1, "Torch")
            .with_kerf_width(MeasuredValue::qualified(1.5, 0.06))])
    }

    fn orchestrator(success: bool) -> OffsetOrchestrator {
        OffsetOrchestrator::new(
            Arc::new(ShiftEngine { success }),
            OffsetParameters::default(),
            MeasurementSystem::Metric,
        )
    }

    #[test]
    fn test_part_mode_role_table() {
        use MemberRole::*;
        let part = KerfCompensation::Part;
        assert_eq!(resolve_offset_direction(part, Standalone), OffsetDirection::None);
        assert_eq!(resolve_offset_direction(part, Shell), OffsetDirection::Outset);
        assert_eq!(resolve_offset_direction(part, Hole), OffsetDirection::Inset);
        assert_eq!(resolve_offset_direction(part, Slot), OffsetDirection::None);
    }

    #[test]
    fn test_signed_distance() {
        assert_eq!(OffsetDirection::Inset.signed_distance(2.0), -1.0);
        assert_eq!(OffsetDirection::Outset.signed_distance(2.0), 1.0);
        assert_eq!(OffsetDirection::None.signed_distance(2.0), 0.0);
    }

    #[tokio::test]
    async fn test_outset_selects_outer_side() {
        let tool_id = ToolId::from("torch");
        let record = orchestrator(true)
            .compute_offset(&chain(), OffsetDirection::Outset, Some(&tool_id), &tools())
            .await
            .expect("offset applied");
        assert_eq!(record.kerf_width, 1.5);
        assert_eq!(record.direction, OffsetDirection::Outset);
        assert_eq!(record.offset_shapes[0].start_point(), Point::new(0.0, 0.75));
        assert_eq!(record.original_shapes, chain().shapes);
        assert_eq!(record.warnings, vec!["note".to_string()]);
    }

    #[tokio::test]
    async fn test_unresolved_tool_skips_offset() {
        let missing = ToolId::from("missing");
        let outcome = orchestrator(true)
            .compute_offset_outcome(&chain(), OffsetDirection::Inset, Some(&missing), &tools())
            .await;
        assert_eq!(outcome, OffsetOutcome::Skipped(OffsetSkip::ToolNotFound(missing)));
    }

    #[tokio::test]
    async fn test_zero_kerf_skips_offset() {
        let tool_id = ToolId::from("zero");
        let tools = ToolLibrary::from_tools([Tool::new(tool_id.clone(), 2, "Zero")]);
        let outcome = orchestrator(true)
            .compute_offset_outcome(&chain(), OffsetDirection::Inset, Some(&tool_id), &tools)
            .await;
        assert_eq!(outcome, OffsetOutcome::Skipped(OffsetSkip::NoKerfWidth(tool_id)));
    }

    #[tokio::test]
    async fn test_engine_failure_degrades_to_none() {
        let tool_id = ToolId::from("torch");
        let outcome = orchestrator(false)
            .compute_offset_outcome(&chain(), OffsetDirection::Inset, Some(&tool_id), &tools())
            .await;
        match outcome {
            OffsetOutcome::Skipped(OffsetSkip::EngineFailed(reason)) => {
                assert!(reason.contains("self-intersecting"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_direction_is_not_a_degradation() {
        let outcome = orchestrator(true)
            .compute_offset_outcome(&chain(), OffsetDirection::None, None, &tools())
            .await;
        match outcome {
            OffsetOutcome::Skipped(reason) => assert!(!reason.is_degradation()),
            OffsetOutcome::Applied(_) => panic!("offset should not apply"),
        }
    }
}
