use anyhow::Context;
use clap::Parser;
use kerfkit::model::MeasurementSystem;
use kerfkit::{init_logging, CompileJob, CompilerConfig, CutCompiler};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kerfkit", version, about = "Compile cutting operations into ordered cut paths")]
struct Cli {
    /// Job file (JSON) with chains, parts, tools and operations
    job: PathBuf,

    /// Compiler configuration (.json or .toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Measurement system for tool values (metric|imperial), overrides the config
    #[arg(long, value_name = "SYSTEM")]
    units: Option<MeasurementSystem>,

    /// Write the result here instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CompilerConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CompilerConfig::default(),
    };
    if let Some(units) = cli.units {
        config.measurement_system = units;
    }
    let job = CompileJob::load_from_file(&cli.job)
        .with_context(|| format!("loading job {}", cli.job.display()))?;

    let compiler = CutCompiler::new(config);
    let reports = job.compile(&compiler).await;
    let json = serde_json::to_string_pretty(&reports)?;

    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
