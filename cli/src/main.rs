mod cli;
mod config;
mod ingest;
mod simulate;

use clap::Parser;

use cli::{Cli, Command};
use config::DispatchConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_logger("dispatch-sim");
    let config = DispatchConfig::from_env();
    tracing::debug!(?config, "resolved runtime configuration");

    let cli = Cli::parse();

    match cli.command {
        Command::Ingest { orders, drivers, ticks } => {
            let orders = ingest::read_orders(&orders)?;
            let drivers = ingest::read_drivers(&drivers)?;
            tracing::info!(
                order_count = orders.len(),
                driver_count = drivers.len(),
                ticks,
                "ingested simulation snapshot"
            );

            let assigned = simulate::run_simulation(orders, drivers, ticks, &config).await?;
            tracing::info!(assigned, "simulation complete");
            println!("assigned {assigned} job(s) across {ticks} tick(s)");
        }
    }

    Ok(())
}
