//! Table statistics command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let counts = store.table_counts().await?;

    println!("Database: {}", config.general.database_path);
    println!("{:-<30}", "");
    for (table, rows) in counts.as_pairs() {
        println!("{:<14} {:>10}", table, rows);
    }
    Ok(())
}
