//! Cut records produced by the compiler.
//!
//! A [`Cut`] is one executable toolpath: the chain the machine follows,
//! the offset applied to get there, the orientation data used by the
//! lead generator and the leads themselves.

use chrono::{DateTime, Utc};
use kerfkit_core::{
    Chain, CutDirection, KerfCompensation, LeadType, Point, Shape, ToolId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::offset::OffsetDirection;

/// Role a chain plays in the operation it was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Chain targeted directly, outside any part
    Standalone,
    /// Outer boundary of a part
    Shell,
    /// Hole of a part, at any nesting depth
    Hole,
    /// Slot of a part
    Slot,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => write!(f, "Standalone"),
            Self::Shell => write!(f, "Shell"),
            Self::Hole => write!(f, "Hole"),
            Self::Slot => write!(f, "Slot"),
        }
    }
}

/// Straight filler inserted where offset shapes failed to meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapFill {
    /// Ids of the shapes on either side of the gap
    pub between: (String, String),
    pub gap_size: f64,
    pub filler: Shape,
}

/// Result of offsetting one chain by half the kerf width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetRecord {
    pub offset_shapes: Vec<Shape>,
    /// Un-offset geometry, deep-copied from the source chain
    pub original_shapes: Vec<Shape>,
    pub direction: OffsetDirection,
    pub kerf_width: f64,
    #[serde(default)]
    pub gap_fills: Vec<GapFill>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Side of the travel direction a cut normal points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    Left,
    Right,
}

/// Unit normal at the start of a cut, pointing to the waste side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutNormal {
    pub normal: Point,
    /// Where the lead-in joins the cut
    pub connection_point: Point,
    pub side: NormalSide,
}

/// Lead-in or lead-out path as a point sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadGeometry {
    pub kind: LeadType,
    pub points: Vec<Point>,
}

impl LeadGeometry {
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}

/// Severity of a lead validation report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Info,
    Warning,
    Error,
}

/// Outcome of lead generation for one cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadValidation {
    pub is_valid: bool,
    pub severity: ValidationSeverity,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LeadValidation {
    /// Valid result; severity escalates to warning when notes are present
    pub fn valid(warnings: Vec<String>) -> Self {
        let severity = if warnings.is_empty() {
            ValidationSeverity::Info
        } else {
            ValidationSeverity::Warning
        };
        Self {
            is_valid: true,
            severity,
            warnings,
            error: None,
        }
    }

    /// Failed result carrying the engine's error message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            severity: ValidationSeverity::Error,
            warnings: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// One executable toolpath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub id: String,
    pub name: String,
    pub operation_id: String,
    /// Source chain id
    pub chain_id: String,
    pub part_id: Option<String>,
    pub tool_id: Option<ToolId>,
    pub role: MemberRole,
    /// Position within the operation's output
    pub order: usize,
    pub enabled: bool,
    /// Direction requested by the operation
    pub cut_direction: CutDirection,
    /// Winding the cut chain actually follows; `None` when no direction was requested
    pub execution_clockwise: Option<bool>,
    pub kerf_compensation: KerfCompensation,
    /// Offset direction resolved from the kerf mode and member role
    pub kerf_direction: OffsetDirection,
    pub kerf_width: Option<f64>,
    pub offset: Option<OffsetRecord>,
    /// Geometry the machine follows, already in execution order
    pub cut_chain: Option<Chain>,
    pub feed_rate: Option<f64>,
    pub plunge_rate: Option<f64>,
    pub is_hole: bool,
    /// Reduced feed percentage for holes
    pub hole_underspeed_percent: Option<f64>,
    pub normal: Option<CutNormal>,
    pub lead_in: Option<LeadGeometry>,
    pub lead_out: Option<LeadGeometry>,
    pub lead_validation: Option<LeadValidation>,
}

impl Cut {
    /// Whether the cut follows offset geometry rather than the raw chain
    pub fn is_offset(&self) -> bool {
        self.offset
            .as_ref()
            .is_some_and(|record| !record.offset_shapes.is_empty())
    }

    pub fn start_point(&self) -> Option<Point> {
        self.cut_chain.as_ref().and_then(Chain::start_point)
    }
}

/// Category of a non-fatal compilation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnresolvedChain,
    UnresolvedPart,
    UnresolvedTool,
    MissingKerfWidth,
    OffsetFailed,
    EmptyChain,
    LeadFailed,
    TaskFailed,
}

/// Non-fatal problem reported alongside the cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileWarning {
    pub kind: WarningKind,
    pub operation_id: String,
    pub target_id: String,
    pub message: String,
}

impl CompileWarning {
    pub fn new(
        kind: WarningKind,
        operation_id: impl Into<String>,
        target_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            operation_id: operation_id.into(),
            target_id: target_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.operation_id, self.target_id, self.message
        )
    }
}

/// Cuts and warnings produced for one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileOutput {
    pub cuts: Vec<Cut>,
    pub warnings: Vec<CompileWarning>,
}

impl CompileOutput {
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty() && self.warnings.is_empty()
    }
}
