use clap::Parser;
use tracing::{info, warn};

use promgate::cli::{Cli, Commands};
use promgate::config::{AppConfig, init_config};
use promgate::errors::MetricsError;
use promgate::metrics::{Gatherer, exposition};
use promgate::runtime::{Shutdown, listen_for_shutdown, prepare_metrics};
use promgate::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    if command == Commands::SampleConfig {
        print!("{}", AppConfig::sample_toml());
        return Ok(());
    }

    let config = match init_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let _guard = init_logging(&config.logging)?;
    let startup = prepare_metrics(&config)?;

    if command == Commands::Gather {
        let families = startup.gatherer.gather()?;
        print!("{}", exposition::encode(&families));
        return Ok(());
    }

    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_shutdown(shutdown.clone()));

    match startup.service.run(shutdown).await {
        Ok(()) => info!("Metrics service exited"),
        Err(MetricsError::Cancelled(reason)) => warn!(%reason, "Metrics service cancelled"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
