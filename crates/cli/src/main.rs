use clap::{Parser, Subcommand};

mod commands;

use commands::{CheckArgs, CompareArgs, GenerateArgs};

#[derive(Parser)]
#[command(name = "causal-compare")]
#[command(about = "Compare five causality tests on a pair of time series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a pair, run every causality test and print the comparison
    Compare(CompareArgs),
    /// Load a pair and print its quality report
    Check(CheckArgs),
    /// Write a synthetic coupled pair as CSV
    Generate(GenerateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compare(args) => {
            commands::run_compare(args).await?;
        }
        Commands::Check(args) => {
            commands::run_check(args).await?;
        }
        Commands::Generate(args) => {
            commands::run_generate(args).await?;
        }
    }

    Ok(())
}
