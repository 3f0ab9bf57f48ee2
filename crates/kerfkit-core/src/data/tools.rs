//! Cutting tools - definitions and catalog lookup
//!
//! This module provides:
//! - Tool identifiers
//! - Measurement-system qualified tool values (feed, kerf, plunge, pierce)
//! - The tool library used to resolve an operation's tool reference

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::units::MeasurementSystem;

/// Tool identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct ToolId(
    /// The unique string identifier for the tool.
    pub String,
);

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        ToolId(s.to_string())
    }
}

/// A tool value that may be given per measurement system.
///
/// The qualified value for the active system wins; the bare value is the
/// fallback when no qualified value is present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasuredValue {
    /// Unqualified value
    #[serde(default)]
    pub value: Option<f64>,
    /// Value when the job is metric
    #[serde(default)]
    pub metric: Option<f64>,
    /// Value when the job is imperial
    #[serde(default)]
    pub imperial: Option<f64>,
}

impl MeasuredValue {
    /// Value without measurement qualification
    pub fn bare(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Value qualified for both systems
    pub fn qualified(metric: f64, imperial: f64) -> Self {
        Self {
            value: None,
            metric: Some(metric),
            imperial: Some(imperial),
        }
    }

    /// Resolve the authoritative value for a measurement system
    pub fn resolve(&self, system: MeasurementSystem) -> Option<f64> {
        let qualified = match system {
            MeasurementSystem::Metric => self.metric,
            MeasurementSystem::Imperial => self.imperial,
        };
        qualified.or(self.value)
    }
}

/// Complete tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool identifier
    pub id: ToolId,
    /// Tool number (for reference)
    #[serde(default)]
    pub number: u32,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Cutting feed rate (units/min)
    #[serde(default)]
    pub feed_rate: MeasuredValue,
    /// Width of material removed by the cut
    #[serde(default)]
    pub kerf_width: MeasuredValue,
    /// Plunge rate (units/min)
    #[serde(default)]
    pub plunge_rate: MeasuredValue,
    /// Torch/head height while piercing
    #[serde(default)]
    pub pierce_height: MeasuredValue,
    /// Dwell after piercing, in seconds
    #[serde(default)]
    pub pierce_delay: Option<f64>,
}

impl Tool {
    /// Create a new tool with basic properties
    pub fn new(id: ToolId, number: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            number,
            name: name.into(),
            feed_rate: MeasuredValue::default(),
            kerf_width: MeasuredValue::default(),
            plunge_rate: MeasuredValue::default(),
            pierce_height: MeasuredValue::default(),
            pierce_delay: None,
        }
    }

    /// Set the kerf width
    pub fn with_kerf_width(mut self, kerf_width: MeasuredValue) -> Self {
        self.kerf_width = kerf_width;
        self
    }

    /// Set the feed rate
    pub fn with_feed_rate(mut self, feed_rate: MeasuredValue) -> Self {
        self.feed_rate = feed_rate;
        self
    }

    /// Kerf width for the active measurement system
    pub fn kerf_width_for(&self, system: MeasurementSystem) -> Option<f64> {
        self.kerf_width.resolve(system)
    }
}

/// Tool library - manages collection of tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolLibrary {
    /// Collection of tools by ID
    tools: HashMap<ToolId, Tool>,
    /// Next available tool number
    next_tool_number: u32,
}

impl ToolLibrary {
    /// Create a new empty tool library
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            next_tool_number: 1,
        }
    }

    /// Build a library from a list of tools
    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut library = Self::new();
        for tool in tools {
            library.add_tool(tool);
        }
        library
    }

    /// Add a tool to the library
    pub fn add_tool(&mut self, tool: Tool) {
        if tool.number >= self.next_tool_number {
            self.next_tool_number = tool.number + 1;
        }
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Get a tool by ID
    pub fn get_tool(&self, id: &ToolId) -> Option<&Tool> {
        self.tools.get(id)
    }

    /// Get all tools, ordered by tool number
    pub fn get_all_tools(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        tools
    }

    /// Get the next available tool number
    pub fn next_tool_number(&self) -> u32 {
        self.next_tool_number
    }

    /// Get the number of tools in the library
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if library is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolLibrary {
    fn default() -> Self {
        Self::new()
    }
}
