//! Cutting operations authored against chains or detected parts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tools::ToolId;

/// What an operation's target ids refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Standalone chains
    #[default]
    Chains,
    /// Detected parts (shell, holes, slots)
    Parts,
}

/// Absolute traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutDirection {
    Clockwise,
    Counterclockwise,
    /// No direction preference
    #[default]
    None,
}

impl CutDirection {
    /// Direction for a stored winding flag
    pub fn from_winding(clockwise: Option<bool>) -> Self {
        match clockwise {
            Some(true) => Self::Clockwise,
            Some(false) => Self::Counterclockwise,
            None => Self::None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Clockwise => Self::Counterclockwise,
            Self::Counterclockwise => Self::Clockwise,
            Self::None => Self::None,
        }
    }

    /// `Some(true)` for clockwise, `None` when there is no preference
    pub fn as_clockwise(self) -> Option<bool> {
        match self {
            Self::Clockwise => Some(true),
            Self::Counterclockwise => Some(false),
            Self::None => None,
        }
    }
}

impl fmt::Display for CutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "clockwise"),
            Self::Counterclockwise => write!(f, "counterclockwise"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Kerf compensation policy chosen by the author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KerfCompensation {
    #[default]
    None,
    /// Offset toward the inside of the boundary
    Inner,
    /// Offset toward the outside of the boundary
    Outer,
    /// Outside for part shells, inside for holes, untouched slots
    Part,
}

impl fmt::Display for KerfCompensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Inner => write!(f, "inner"),
            Self::Outer => write!(f, "outer"),
            Self::Part => write!(f, "part"),
        }
    }
}

/// Lead geometry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    #[default]
    None,
    Line,
    Arc,
}

/// Lead-in or lead-out settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadConfig {
    #[serde(rename = "type", default)]
    pub lead_type: LeadType,
    /// Lead length (arc leads use it as radius)
    #[serde(default)]
    pub length: f64,
    /// Approach angle in degrees, 0 meaning perpendicular to the cut
    #[serde(default)]
    pub angle: f64,
    /// Allow the engine to shorten the lead to fit the available material
    #[serde(default)]
    pub fit: bool,
}

impl LeadConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn line(length: f64) -> Self {
        Self {
            lead_type: LeadType::Line,
            length,
            ..Self::default()
        }
    }

    pub fn arc(length: f64) -> Self {
        Self {
            lead_type: LeadType::Arc,
            length,
            ..Self::default()
        }
    }

    /// A lead with no type or no length produces no geometry
    pub fn is_none(&self) -> bool {
        self.lead_type == LeadType::None || self.length <= 0.0
    }
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            lead_type: LeadType::None,
            length: 0.0,
            angle: 0.0,
            fit: false,
        }
    }
}

/// Start point optimization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeStarts {
    #[default]
    None,
    /// Start closed cuts at the midpoint of their first shape
    Midpoint,
}

/// A cutting operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub target_ids: Vec<String>,
    #[serde(default)]
    pub tool_id: Option<ToolId>,
    #[serde(default)]
    pub cut_direction: CutDirection,
    #[serde(default)]
    pub kerf_compensation: KerfCompensation,
    #[serde(default)]
    pub lead_in: LeadConfig,
    #[serde(default)]
    pub lead_out: LeadConfig,
    #[serde(default)]
    pub hole_underspeed_enabled: bool,
    /// Feed percentage applied to holes when underspeed is enabled
    #[serde(default = "default_underspeed")]
    pub hole_underspeed_percent: f64,
    #[serde(default)]
    pub optimize_starts: OptimizeStarts,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub order: u32,
}

fn default_underspeed() -> f64 {
    60.0
}

fn default_enabled() -> bool {
    true
}

impl Operation {
    /// Create an enabled operation with no kerf, leads or direction preference
    pub fn new(id: impl Into<String>, name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target_type,
            target_ids: Vec::new(),
            tool_id: None,
            cut_direction: CutDirection::None,
            kerf_compensation: KerfCompensation::None,
            lead_in: LeadConfig::none(),
            lead_out: LeadConfig::none(),
            hole_underspeed_enabled: false,
            hole_underspeed_percent: default_underspeed(),
            optimize_starts: OptimizeStarts::None,
            enabled: true,
            order: 0,
        }
    }

    pub fn with_targets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(ToolId(tool_id.into()));
        self
    }

    pub fn with_direction(mut self, direction: CutDirection) -> Self {
        self.cut_direction = direction;
        self
    }

    pub fn with_kerf(mut self, kerf: KerfCompensation) -> Self {
        self.kerf_compensation = kerf;
        self
    }

    pub fn with_leads(mut self, lead_in: LeadConfig, lead_out: LeadConfig) -> Self {
        self.lead_in = lead_in;
        self.lead_out = lead_out;
        self
    }

    pub fn with_optimize_starts(mut self, mode: OptimizeStarts) -> Self {
        self.optimize_starts = mode;
        self
    }

    /// Whether compiling this operation can produce any cut
    pub fn is_compilable(&self) -> bool {
        self.enabled && !self.target_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_helpers() {
        assert_eq!(CutDirection::from_winding(Some(true)), CutDirection::Clockwise);
        assert_eq!(CutDirection::from_winding(None), CutDirection::None);
        assert_eq!(CutDirection::Clockwise.opposite(), CutDirection::Counterclockwise);
        assert_eq!(CutDirection::None.opposite(), CutDirection::None);
    }

    #[test]
    fn test_operation_defaults_from_json() {
        let op: Operation = serde_json::from_str(
            r#"{"id":"op1","name":"Profile","target_ids":["c1"],"kerf_compensation":"part"}"#,
        )
        .unwrap();
        assert!(op.enabled);
        assert!(op.is_compilable());
        assert_eq!(op.kerf_compensation, KerfCompensation::Part);
        assert_eq!(op.target_type, TargetType::Chains);
        assert!(op.lead_in.is_none());
        assert_eq!(op.hole_underspeed_percent, 60.0);
    }

    #[test]
    fn test_disabled_operation_is_not_compilable() {
        let mut op = Operation::new("op", "Cut", TargetType::Parts).with_targets(["p1"]);
        assert!(op.is_compilable());
        op.enabled = false;
        assert!(!op.is_compilable());
    }

    #[test]
    fn test_lead_config_json_uses_type_key() {
        let lead: LeadConfig = serde_json::from_str(r#"{"type":"arc","length":3.0}"#).unwrap();
        assert_eq!(lead, LeadConfig::arc(3.0));
    }
}
