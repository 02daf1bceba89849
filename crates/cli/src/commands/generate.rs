//! Generate CLI command.
//!
//! Writes a synthetic pair where X drives Y with a known delay, for trying
//! the comparison without a dataset.

use anyhow::{ensure, Result};
use clap::Args;
use std::path::PathBuf;

use causal_compare_data::{generate_pair, write_csv, SyntheticConfig};

/// Arguments for the generate command.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Output CSV file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of samples (default: 1000)
    #[arg(long, default_value = "1000")]
    pub samples: usize,

    /// Delay of the X -> Y coupling in samples (default: 10)
    #[arg(long, default_value = "10")]
    pub lag: usize,

    /// Weight of the lagged X term (default: 0.8)
    #[arg(long, default_value = "0.8")]
    pub coupling: f64,

    /// Standard deviation of Y's own noise (default: 0.3)
    #[arg(long, default_value = "0.3")]
    pub noise: f64,

    /// Random seed (default: 42)
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Prefix each row with a 1-based index column
    #[arg(long)]
    pub with_index: bool,
}

pub async fn run_generate(args: GenerateArgs) -> Result<()> {
    ensure!(
        args.samples > args.lag,
        "samples ({}) must exceed lag ({})",
        args.samples,
        args.lag
    );
    ensure!(args.noise >= 0.0, "noise must be non-negative");

    let config = SyntheticConfig::new(args.samples, args.lag)
        .with_coupling(args.coupling)
        .with_noise(args.noise)
        .with_seed(args.seed);

    let (x, y) = generate_pair(&config);
    write_csv(&args.output, &x, &y, args.with_index)?;

    tracing::info!(
        "Wrote {} samples to {} (Y[t] = {} * X[t - {}] + {} * noise)",
        args.samples,
        args.output.display(),
        args.coupling,
        args.lag,
        args.noise
    );
    Ok(())
}
