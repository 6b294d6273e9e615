use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Cli, Commands};
use ghiras::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        // Manages the file itself, so it must work before one exists.
        Commands::Config(args) => cli::config::run(args, config_path),
        Commands::Diagnose(args) => {
            let config = init(config_path, cli.verbose)?;
            cli::diagnose::run(args, &config).await
        }
        Commands::Ask(args) => {
            let config = init(config_path, cli.verbose)?;
            cli::ask::run(args, &config).await
        }
        Commands::Chat(args) => {
            let config = init(config_path, cli.verbose)?;
            cli::chat::run(args, &config).await
        }
    }
}

/// Load the config and install the tracing subscriber it configures.
fn init(config_path: Option<&str>, verbose: bool) -> Result<Config> {
    let config = cli::common::load_config(config_path)?;

    // Initialize logging
    let log_level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    Ok(config)
}
