pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod parser;
pub mod reader;
pub mod services;

use clap::CommandFactory;
use cli::{Cli, Commands};
pub use config::Config;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run { steps } => cli::cmd_run(&config, &steps).await,
        Commands::Extract => cli::cmd_extract(&config).await,
        Commands::Transform => cli::cmd_transform(&config).await,
        Commands::Load => cli::cmd_load(&config).await,
        Commands::InitDb => cli::cmd_init_db(&config).await,
        Commands::Query { json, query } => cli::cmd_query(&config, &query, json).await,
        Commands::Stats => cli::cmd_stats(&config).await,
        Commands::Init => cli::cmd_init(),
    }
}
