//! Pipeline stage command handlers

use crate::cli::Step;
use crate::config::Config;
use crate::db::Store;
use crate::services::{extract, load, transform};
use tracing::info;

pub async fn cmd_extract(config: &Config) -> anyhow::Result<()> {
    let (written, report) = extract::run(config).await?;

    println!(
        "Extract complete: {} looked up, {} resolved, {} absent, {} failed",
        report.looked_up, report.resolved, report.absent, report.failed
    );
    match written {
        Some(path) => println!("Metadata written to {}", path.display()),
        None => println!("No metadata resolved; nothing written."),
    }
    Ok(())
}

pub async fn cmd_transform(config: &Config) -> anyhow::Result<()> {
    let report = transform::run(config).await?;

    println!(
        "Transform complete: {} rows dropped, {} conflicts",
        report.rows_dropped(),
        report.movie_conflicts + report.duplicate_ratings + report.metadata_conflicts
    );
    println!("Processed files in {}", config.processed_dir().display());
    Ok(())
}

pub async fn cmd_load(config: &Config) -> anyhow::Result<()> {
    let counts = load::run(config).await?;

    println!("Load complete:");
    for (table, rows) in counts.as_pairs() {
        println!("  {:<14} {}", table, rows);
    }
    Ok(())
}

pub async fn cmd_init_db(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    store.ping().await?;
    println!("Schema applied to {}", config.general.database_path);
    Ok(())
}

pub async fn cmd_run(config: &Config, steps: &[Step]) -> anyhow::Result<()> {
    for step in steps {
        info!(?step, "Running step");
        match step {
            Step::Extract => cmd_extract(config).await?,
            Step::Transform => cmd_transform(config).await?,
            Step::Load => cmd_load(config).await?,
        }
    }
    Ok(())
}
