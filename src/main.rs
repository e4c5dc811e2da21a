use clap::Parser;
use movie_etl::cli::Cli;
use movie_etl::{Config, init_tracing, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    init_tracing(&config.general.log_level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}
