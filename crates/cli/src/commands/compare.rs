//! Compare CLI command.
//!
//! Loads a pair of series, checks and cleans delimited input, runs the five
//! causality tests and prints the comparison table with the agreement tally.

use anyhow::{ensure, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use causal_compare_core::{AnalysisConfig, ConfigLoader, LagConfig, SourceKind};
use causal_compare_data::{check_and_clean, load_pair, SourceHint};
use causal_compare_methods::{ComparisonReport, MethodSuite};

/// Arguments for the compare command.
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Input file: a MATLAB .mat file or delimited text
    #[arg(short, long)]
    pub input: PathBuf,

    /// How to read the input: auto, binary, delimited
    #[arg(long, default_value = "auto", value_enum, ignore_case = true)]
    pub source: SourceArg,

    /// Output format: text or json
    #[arg(long, default_value = "text", value_enum, ignore_case = true)]
    pub format: OutputFormat,

    /// Configuration file (default: causal-compare.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum lag for every method, overriding the per-source default
    #[arg(long)]
    pub max_lag: Option<usize>,

    /// Significance level
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Run the methods on parallel worker tasks
    #[arg(long)]
    pub parallel: bool,
}

/// Output format for comparison reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Aligned table followed by the agreement summary
    #[default]
    #[value(alias = "txt")]
    Text,
    /// Pretty-printed JSON report
    Json,
}

/// How the input file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SourceArg {
    /// Decide from the file extension
    #[default]
    Auto,
    /// MATLAB .mat container
    #[value(alias = "mat")]
    Binary,
    /// Delimited text
    #[value(aliases = ["text", "csv"])]
    Delimited,
}

impl From<SourceArg> for SourceHint {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Auto => SourceHint::Auto,
            SourceArg::Binary => SourceHint::Binary,
            SourceArg::Delimited => SourceHint::Delimited,
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut AnalysisConfig, args: &CompareArgs) -> Result<()> {
    if let Some(alpha) = args.alpha {
        ensure!(
            alpha > 0.0 && alpha < 1.0,
            "alpha must be between 0 and 1, got {alpha}"
        );
        config.alpha = alpha;
    }
    if let Some(max_lag) = args.max_lag {
        ensure!(max_lag >= 1, "max lag must be at least 1");
        config.lags = LagConfig::uniform(max_lag);
    }
    if args.parallel {
        config.parallel = true;
    }
    Ok(())
}

pub async fn run_compare(args: CompareArgs) -> Result<()> {
    let hint = SourceHint::from(args.source);

    let mut config = ConfigLoader::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let pair = load_pair(&args.input, hint, config.min_samples)?;
    let pair = match pair.source() {
        SourceKind::Delimited => check_and_clean(pair, config.min_samples)?.0,
        SourceKind::Binary => pair,
    };
    let source = pair.source();
    let samples = pair.len();

    let suite = MethodSuite::standard(&config, source);
    tracing::info!(
        "Running {} methods on {} samples (max lag {}, {})",
        suite.len(),
        samples,
        config.lags.for_source(source),
        if config.parallel { "parallel" } else { "sequential" }
    );

    let pair = Arc::new(pair);
    let results = if config.parallel {
        suite.run_concurrent(Arc::clone(&pair)).await
    } else {
        suite.run(&pair)
    };

    let report = ComparisonReport::new(
        args.input.display().to_string(),
        source.to_string(),
        samples,
        &results,
    );

    match args.format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
