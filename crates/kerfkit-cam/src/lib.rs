//! # KerfKit CAM
//!
//! Compiles cutting operations into ordered, machine-ready cuts.
//!
//! For every target of an [`Operation`](kerfkit_core::Operation) the
//! compiler resolves the cut direction, applies kerf compensation through
//! an [`OffsetEngine`], orders part members (shell, nested holes, slots),
//! optionally moves start points and attaches lead-ins and lead-outs. All
//! geometry engines sit behind traits; [`Engines::defaults`] wires in the
//! built-in ones.

pub mod compiler;
pub mod config;
pub mod cut;
pub mod decompose;
pub mod direction;
pub mod error;
pub mod generation;
pub mod leads;
pub mod offset;
pub mod orientation;
pub mod start_point;

pub use compiler::{CutCompiler, Engines};
pub use config::{CompilerConfig, OffsetParameters};
pub use cut::{
    CompileOutput, CompileWarning, Cut, CutNormal, GapFill, LeadGeometry, LeadValidation,
    MemberRole, NormalSide, OffsetRecord, ValidationSeverity, WarningKind,
};
pub use decompose::{CompilePlan, PartDecomposer, PartMember, PlanEntry};
pub use direction::{create_cut_chain, natural_direction, CutChainResult};
pub use error::{CamError, CamResult};
pub use generation::{CompileGenerations, GenerationTicket};
pub use leads::{
    select_lead_source, ArcLineLeadEngine, CutLeads, LeadEngine, LeadOrchestrator, LeadRequest,
    LeadResult,
};
pub use offset::{
    resolve_offset_direction, CavalierOffsetEngine, ChainOffsetResult, OffsetDirection,
    OffsetEngine, OffsetOrchestrator, OffsetOutcome, OffsetSide, OffsetSkip,
};
pub use orientation::{NormalEngine, WasteSideNormalEngine};
pub use start_point::{MidpointStartOptimizer, StartPointOptimizer, StartPointUpdate};
