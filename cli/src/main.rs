//! govctl: inspect governance configuration and replay scenarios offline

mod config;
mod report;
mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use governance::store;
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "govctl")]
#[command(about = "Timelocked token governance toolkit", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file and print the effective settings
    Config {
        /// TOML file with [governor] and [timelock] sections
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Replay a scenario file against a fresh governor and timelock
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the final governor and timelock state here
        #[arg(long, value_name = "FILE")]
        state_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { file, json } => {
            let config = config::load_engine_config(file.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                report::print_config(&config)?;
            }
        }

        Commands::Simulate {
            scenario,
            json,
            state_out,
        } => {
            let text = config::read(&scenario)?;
            let origin = scenario.display().to_string();
            let (report, simulation) = scenario::simulate(&text, &origin)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report::print_report(&report);
            }
            if let Some(path) = state_out {
                write_state(&path, &simulation)?;
            }
        }
    }

    Ok(())
}

fn write_state(path: &Path, simulation: &scenario::Simulation) -> Result<()> {
    store::save(path, &simulation.ledger().snapshot())
        .with_context(|| format!("Failed to write state to {}", path.display()))?;
    info!("state written to {}", path.display());
    Ok(())
}
