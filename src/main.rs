use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};

use claimlab::configuration::Config;
use claimlab::error_handling::types::PipelineError;
use claimlab::{analysis, dashboard, generator, storage};

#[derive(Parser, Debug)]
#[command(name = "claimlab")]
#[command(version = "0.1.0")]
#[command(about = "Synthetic car insurance claims: generate, load, report and chart")]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true, env = "CLAIMLAB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Generate synthetic claims into the flat file
    Generate {
        #[arg(long)]
        records: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Generation instant, "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        anchor: Option<String>,
    },
    /// Replace-load the flat file into the SQLite table
    Load,
    /// Run the three grouping queries and write the SQL audit file
    Report,
    /// Render the charts and the text summary from the flat file
    Charts {
        #[arg(long)]
        premium_seed: Option<u64>,
    },
    /// Export the multi-sheet dashboard workbook
    Export,
}

impl Command {
    fn apply_overrides(&self, config: &mut Config) {
        match self {
            Command::Generate {
                records,
                seed,
                anchor,
            } => {
                if let Some(records) = records {
                    config.generator.record_count = *records;
                }
                if let Some(seed) = seed {
                    config.generator.seed = *seed;
                }
                if let Some(anchor) = anchor {
                    config.generator.anchor = Some(anchor.clone());
                }
            }
            Command::Charts { premium_seed } => {
                if let Some(seed) = premium_seed {
                    config.charts.premium_seed = *seed;
                }
            }
            Command::Load | Command::Report | Command::Export => {}
        }
    }

    fn run(&self, config: &Config) -> Result<(), PipelineError> {
        match self {
            Command::Generate { .. } => generator::run(config).map(|_| ()),
            Command::Load => storage::loader::run(config).map(|_| ()),
            Command::Report => analysis::report_runner::run(config).map(|_| ()),
            Command::Charts { .. } => dashboard::builder::run(config).map(|_| ()),
            Command::Export => dashboard::workbook::run(config),
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    info!("Importing configuration");
    let mut config = Config::load(args.config.as_deref()).unwrap_or_else(|e| {
        error!("Unable to import configuration: {}", e);
        std::process::exit(1);
    });
    args.command.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    info!("Configuration imported successfully");

    if let Err(e) = args.command.run(&config) {
        error!("{:?} stage failed: {}", args.command, e);
        std::process::exit(1);
    }
}
