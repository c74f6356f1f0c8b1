// src/cli.rs
//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use legiscraper::config::{CONFIG_FILENAME, ENV_CONFIG};

#[derive(Parser)]
#[command(
    name = "legiscraper",
    version,
    about = "Load legislative bulk-data CSV exports into PostgreSQL"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file with one section per region.
    #[arg(long, value_name = "FILE", global = true, env = ENV_CONFIG, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the roster and every session of one region.
    LoadRegion {
        /// Postal abbreviation, name, or key ("IL", "Illinois", "new_hampshire").
        region: String,

        /// Directory holding one `<ABBR>/` folder per region.
        #[arg(long, value_name = "DIR", default_value = ".")]
        data_root: PathBuf,

        /// Record failed files and continue instead of stopping.
        #[arg(long)]
        keep_going: bool,

        /// Write the batch report as JSON.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Clean and load individual files.
    LoadFile {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Create every enum type and table in a region's database.
    Init { region: String },

    /// Classify and dry-run clean files; nothing is written or loaded.
    Check {
        /// Files, or directories searched for `*.csv`.
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the full DDL in load order.
    Schema,
}
