use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "dispatch-sim", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load an orders/drivers CSV snapshot and run the batching + wave
    /// dispatch loop against it for a fixed number of ticks.
    Ingest {
        #[clap(long)]
        orders: PathBuf,

        #[clap(long)]
        drivers: PathBuf,

        /// Number of batching/dispatch ticks to run before exiting.
        #[clap(long, default_value = "5")]
        ticks: u32,
    },
}
