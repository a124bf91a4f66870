use std::path::PathBuf;

use arcstat_cli::{Overrides, commands, logging};
use arcstat_core::EngineConfigExt;
use arcstat_types::EngineConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Encounter statistics for parsed combat logs")]
struct Cli {
    /// Buff catalog TOML, overrides the configured one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Worker threads (0 = all cores)
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate an event dump into a report
    Aggregate {
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print a per-player overview
    Summary { input: PathBuf },
    /// Validate a buff catalog (bundled one when no path is given)
    CheckCatalog { path: Option<PathBuf> },
    /// Show the effective configuration
    Config {
        /// Persist the effective configuration
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), String> {
    logging::init();
    let cli = Cli::parse();

    let mut overrides = Overrides {
        catalog: cli.catalog,
        workers: cli.workers,
        pretty: false,
    };
    if let Commands::Aggregate { pretty, .. } = &cli.command {
        overrides.pretty = *pretty;
    }
    let config = overrides.apply(EngineConfig::load());

    match &cli.command {
        Commands::Aggregate { input, out, .. } => {
            commands::aggregate_file(input, out.as_deref(), &config)
        }
        Commands::Summary { input } => commands::show_summary(input, &config),
        Commands::CheckCatalog { path } => commands::check_catalog(path.as_deref()),
        Commands::Config { save } => {
            if *save {
                commands::save_config(&config)?;
            }
            commands::show_config(&config)
        }
    }
}
