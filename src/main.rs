use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use tsn_report::analysis::report;
use tsn_report::config::{ClassMap, UnmatchedPolicy};
use tsn_report::config_loader::{self, ClassMapOverrides};
use tsn_report::orchestrator;
use tsn_report::utils::parse_sim_time;

/// Latency and bandwidth reports for OMNeT++ TSN simulations
#[derive(Parser, Debug)]
#[command(name = "tsn-report", author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

/// Class map selection shared by the commands that classify or rate traffic
#[derive(ClapArgs, Debug)]
struct ClassMapArgs {
    /// Traffic class map YAML (built-in humanoid classes when omitted)
    #[arg(long)]
    class_map: Option<PathBuf>,

    /// What to do with vectors of modules no class matches
    #[arg(long, value_enum)]
    unmatched: Option<UnmatchedPolicy>,

    /// Packet size in bytes for classes without their own
    #[arg(long)]
    packet_bytes: Option<u32>,

    /// Link capacity in Mbps used for utilization
    #[arg(long)]
    link_mbps: Option<f64>,
}

impl ClassMapArgs {
    fn load(&self) -> Result<ClassMap> {
        let mut map = config_loader::load_or_default(self.class_map.as_deref())
            .wrap_err("Failed to load class map")?;

        let overrides = ClassMapOverrides {
            unmatched: self.unmatched,
            default_packet_bytes: self.packet_bytes,
            link_capacity_mbps: self.link_mbps,
        };
        config_loader::apply_overrides(&mut map, &overrides)
            .wrap_err("Invalid class map override")?;

        Ok(map)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract per-class end-to-end delay statistics from a CSV-R export
    Extract {
        /// CSV-R export of the simulation results
        #[arg(long)]
        results_csv: PathBuf,

        /// Output JSON latency summary
        #[arg(long)]
        out_json: PathBuf,

        #[command(flatten)]
        class_map: ClassMapArgs,
    },

    /// Convert a JSON latency summary to a per-class latency CSV
    Classes {
        /// JSON latency summary
        #[arg(long)]
        in_json: PathBuf,

        /// Output CSV
        #[arg(long)]
        out_csv: PathBuf,

        /// Configuration label written into every row
        #[arg(long)]
        config_name: String,
    },

    /// Convert a JSON latency summary to the unified latency/bandwidth CSV
    Unified {
        /// JSON latency summary
        #[arg(long)]
        in_json: PathBuf,

        /// Output CSV
        #[arg(long)]
        out_csv: PathBuf,

        /// Configuration label written into every row
        #[arg(long)]
        config_name: String,

        /// Simulated duration ("0.5", "500ms", "2s")
        #[arg(long, value_parser = parse_sim_time, allow_hyphen_values = true)]
        sim_time: f64,

        #[command(flatten)]
        class_map: ClassMapArgs,
    },

    /// Extract and format in one go, writing every report into a directory
    Report {
        /// CSV-R export of the simulation results
        #[arg(long)]
        results_csv: PathBuf,

        /// Output directory for reports
        #[arg(long)]
        out_dir: PathBuf,

        /// Configuration label written into every row
        #[arg(long)]
        config_name: String,

        /// Simulated duration ("0.5", "500ms", "2s")
        #[arg(long, value_parser = parse_sim_time, allow_hyphen_values = true)]
        sim_time: f64,

        #[command(flatten)]
        class_map: ClassMapArgs,
    },

    /// Export native .sca/.vec result files to CSV-R with opp_scavetool
    Export {
        /// Output CSV-R file
        #[arg(long)]
        out_csv: PathBuf,

        /// Path to opp_scavetool (searched in the usual OMNeT++ locations otherwise)
        #[arg(long)]
        scavetool: Option<PathBuf>,

        /// Result files to export
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    match args.command {
        Command::Extract {
            results_csv,
            out_json,
            class_map,
        } => {
            let map = class_map.load()?;
            let latency = orchestrator::run_extract(&results_csv, &out_json, &map)
                .wrap_err_with(|| format!("Failed to extract latency from {}", results_csv.display()))?;
            report::print_latency_table(&latency);
            info!("Latency summary written to {}", out_json.display());
        }
        Command::Classes {
            in_json,
            out_csv,
            config_name,
        } => {
            let rows = orchestrator::run_latency_classes(&in_json, &out_csv, &config_name)
                .wrap_err_with(|| format!("Failed to format {}", in_json.display()))?;
            info!("Wrote {} class rows to {}", rows.len(), out_csv.display());
        }
        Command::Unified {
            in_json,
            out_csv,
            config_name,
            sim_time,
            class_map,
        } => {
            let map = class_map.load()?;
            let rows = orchestrator::run_unified(&in_json, &out_csv, &config_name, sim_time, &map)
                .wrap_err_with(|| format!("Failed to build unified report from {}", in_json.display()))?;
            report::print_unified_table(&rows);
        }
        Command::Report {
            results_csv,
            out_dir,
            config_name,
            sim_time,
            class_map,
        } => {
            let map = class_map.load()?;
            let (paths, rows) =
                orchestrator::run_report(&results_csv, &out_dir, &config_name, sim_time, &map)
                    .wrap_err_with(|| format!("Failed to report on {}", results_csv.display()))?;
            report::print_unified_table(&rows);
            info!("Text report: {}", paths.text_report.display());
        }
        Command::Export {
            out_csv,
            scavetool,
            inputs,
        } => {
            orchestrator::run_export(scavetool.as_deref(), &inputs, &out_csv)
                .wrap_err("Failed to export simulation results")?;
        }
    }

    Ok(())
}
