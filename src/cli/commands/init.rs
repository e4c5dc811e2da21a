//! Config bootstrap command handler

use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!("Set omdb.api_key (or OMDB_API_KEY) before running extract.");
    } else {
        println!("config.toml already exists.");
    }
    Ok(())
}
