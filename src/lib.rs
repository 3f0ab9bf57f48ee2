//! # KerfKit
//!
//! Turns the chains and parts detected in a drawing, plus a list of
//! cutting operations, into ordered, kerf-compensated cut paths for
//! plasma, laser and waterjet profile cutting.
//!
//! ## Architecture
//!
//! KerfKit is organized as a workspace:
//!
//! 1. **kerfkit-core** - Geometry, chains, parts, tools and operations
//! 2. **kerfkit-cam** - The operation to cut compiler and its engines
//! 3. **kerfkit** - Job files, logging setup and the command-line tool

pub use kerfkit_cam as cam;
pub use kerfkit_core as model;

pub use kerfkit_cam::{CompileOutput, CompileWarning, CompilerConfig, Cut, CutCompiler};
pub use kerfkit_core::{Chain, Operation, Part, Tool, ToolLibrary};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr, keeping stdout free for results
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Everything needed to compile a drawing: detected geometry, the tool
/// catalog and the operations to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileJob {
    #[serde(default)]
    pub chains: Vec<Chain>,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Endpoint tolerance; the configured offset tolerance when absent
    #[serde(default)]
    pub tolerance: Option<f64>,
}

/// Compile result of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation_id: String,
    pub operation_name: String,
    #[serde(flatten)]
    pub output: CompileOutput,
}

impl CompileJob {
    /// Load a job from a JSON file
    pub fn load_from_file(path: &Path) -> kerfkit_core::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn tool_library(&self) -> ToolLibrary {
        ToolLibrary::from_tools(self.tools.iter().cloned())
    }

    /// Compile every operation, in `order` then listing order.
    ///
    /// Disabled operations are reported with an empty result.
    pub async fn compile(&self, compiler: &CutCompiler) -> Vec<OperationReport> {
        let tools = self.tool_library();
        let tolerance = self
            .tolerance
            .unwrap_or(compiler.config().offset.tolerance);

        let mut operations: Vec<&Operation> = self.operations.iter().collect();
        operations.sort_by_key(|op| op.order);

        let mut reports = Vec::with_capacity(operations.len());
        for operation in operations {
            let output = compiler
                .create_cuts_from_operation(
                    operation,
                    &self.chains,
                    &self.parts,
                    &tools,
                    tolerance,
                )
                .await;
            reports.push(OperationReport {
                operation_id: operation.id.clone(),
                operation_name: operation.name.clone(),
                output,
            });
        }
        info!(
            "Compiled {} operations into {} cuts",
            reports.len(),
            reports.iter().map(|r| r.output.cuts.len()).sum::<usize>()
        );
        reports
    }
}
