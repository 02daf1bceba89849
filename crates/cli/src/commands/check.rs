//! Check CLI command.
//!
//! Loads a pair and prints its quality report without running any method.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use causal_compare_core::{ConfigLoader, SourceKind};
use causal_compare_data::{check, clean, load_pair, SourceHint};

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Input file: a MATLAB .mat file or delimited text
    #[arg(short, long)]
    pub input: PathBuf,

    /// Configuration file (default: causal-compare.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    let pair = load_pair(&args.input, SourceHint::Auto, config.min_samples)?;

    let report = check(&pair);
    println!("Quality report for {} ({})", args.input.display(), pair.source());
    println!("{}", report.to_text());

    if report.has_issues() && pair.source() == SourceKind::Delimited {
        let cleaned = clean(&pair, config.min_samples)?;
        println!(
            "Cleaning would keep {} of {} rows.",
            cleaned.len(),
            pair.len()
        );
    }

    Ok(())
}
