use std::path::PathBuf;

use bizsim::{AnalysisRequest, init_logging};
use clap::Parser;
use color_eyre::eyre::eyre;

#[derive(Parser, Debug)]
#[command(name = "bizsim")]
#[command(about = "Monte Carlo, sensitivity, tornado and scenario analysis for business models")]
struct Args {
    /// Path to the YAML analysis request
    request: PathBuf,

    /// Override the iteration count of simulation and scenario requests
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Override the seed of simulation and scenario requests
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level);

    let mut request = AnalysisRequest::load(&args.request)?;
    request.apply_overrides(args.iterations, args.seed);

    tracing::info!(kind = request.kind(), "Running analysis");
    let report = request.execute()?;

    match args.output {
        Some(path) => report.write(&path)?,
        None => {
            let yaml = report
                .to_yaml()
                .map_err(|e| eyre!("Failed to serialize report: {e}"))?;
            print!("{yaml}");
        }
    }

    Ok(())
}
