//! Tool catalog and cutting operation records.

pub mod operations;
pub mod tools;

pub use operations::{
    CutDirection, KerfCompensation, LeadConfig, LeadType, Operation, OptimizeStarts, TargetType,
};
pub use tools::{MeasuredValue, Tool, ToolId, ToolLibrary};
