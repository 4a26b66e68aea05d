//! Per-module analysis of a single OMNeT++ run from its native result files.
//!
//! Reads `.sca` and `.vec` files directly, without a CSV-R export.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};

use tsn_report::orchestrator;

#[derive(Parser)]
#[command(name = "omnet-run-analyzer")]
#[command(about = "Scalar export and per-module delay summary of an OMNeT++ run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every scalar of a .sca file to CSV
    Scalars {
        /// Scalar result file
        sca: PathBuf,

        /// Output CSV
        out_csv: PathBuf,
    },

    /// Summarize delay vectors per module, joined with packet counters
    Summary {
        /// Vector result file
        vec: PathBuf,

        /// Scalar result file
        sca: PathBuf,

        /// Output directory (tsn_summary.csv)
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Scalars { sca, out_csv } => {
            let count = orchestrator::run_scalar_export(&sca, &out_csv)
                .with_context(|| format!("Failed to export scalars of {}", sca.display()))?;
            println!("Exported {} scalars to {}", count, out_csv.display());
        }
        Commands::Summary { vec, sca, out_dir } => {
            let out_csv = orchestrator::run_module_summary(&vec, &sca, &out_dir)
                .with_context(|| format!("Failed to summarize {}", vec.display()))?;
            println!("Summary written to {}", out_csv.display());
        }
    }

    Ok(())
}
