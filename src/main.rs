//! Cardsignal CLI entry point.

use anyhow::Context;
use clap::Parser;

use cardsignal::cli::{Cli, Commands};
use cardsignal::infrastructure::logging::{LogConfig, LoggerImpl};
use cardsignal::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cardsignal::cli::handle_error(err, cli.json),
    };
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging))
        .context("Failed to initialize logging")
    {
        Ok(logger) => logger,
        Err(err) => cardsignal::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => cardsignal::cli::commands::run::execute(args, &config, cli.json).await,
        Commands::Import(args) => {
            cardsignal::cli::commands::import::execute(args, &config, cli.json).await
        }
        Commands::Status => cardsignal::cli::commands::status::execute(&config, cli.json).await,
        Commands::Pending => cardsignal::cli::commands::pending::execute(&config, cli.json).await,
        Commands::Tune(args) => cardsignal::cli::commands::tune::execute(args, &config, cli.json).await,
        Commands::Clear(args) => {
            cardsignal::cli::commands::clear::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        cardsignal::cli::handle_error(err, cli.json);
    }
}
