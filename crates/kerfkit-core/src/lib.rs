//! # KerfKit Core
//!
//! Core data model for KerfKit.
//! Provides the geometry primitives, chains, detected parts, tool catalog
//! and cutting operations consumed by the cut compiler.

pub mod constants;
pub mod data;
pub mod error;
pub mod geometry;
pub mod units;

pub use data::{
    CutDirection, KerfCompensation, LeadConfig, LeadType, MeasuredValue, Operation,
    OptimizeStarts, TargetType, Tool, ToolId, ToolLibrary,
};

pub use error::{Error, GeometryError, Result};

pub use geometry::{
    clone_shapes, Arc, BoundingBox, Chain, Circle, Ellipse, Geometry, Line, Part, PartHole,
    PartSlot, Point, Polyline, Segment, Shape, Spline,
};

pub use units::MeasurementSystem;
