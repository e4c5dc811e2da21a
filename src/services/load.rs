//! Load stage: processed files into the store as one full refresh.

use crate::config::Config;
use crate::db::Store;
use crate::models::{EntitySet, TableCounts};
use crate::reader;
use crate::services::transform::{
    GENRES_FILE, MOVIE_GENRES_FILE, MOVIES_FILE, OMDB_DETAILS_FILE, RATINGS_FILE, USERS_FILE,
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const REQUIRED_FILES: [&str; 5] = [
    MOVIES_FILE,
    GENRES_FILE,
    MOVIE_GENRES_FILE,
    USERS_FILE,
    RATINGS_FILE,
];

/// Read the processed tables back. Only the metadata table is optional.
pub fn read_processed(processed_dir: &Path) -> Result<EntitySet> {
    let missing: Vec<&str> = REQUIRED_FILES
        .iter()
        .copied()
        .filter(|name| !processed_dir.join(name).is_file())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "Missing processed files in {}: {} (run the transform step first)",
            processed_dir.display(),
            missing.join(", ")
        );
    }

    let details = processed_dir.join(OMDB_DETAILS_FILE);
    let omdb_details = if details.is_file() {
        reader::read_all(&details)?
    } else {
        Vec::new()
    };

    Ok(EntitySet {
        movies: reader::read_all(&processed_dir.join(MOVIES_FILE))?,
        genres: reader::read_all(&processed_dir.join(GENRES_FILE))?,
        movie_genres: reader::read_all(&processed_dir.join(MOVIE_GENRES_FILE))?,
        users: reader::read_all(&processed_dir.join(USERS_FILE))?,
        ratings: reader::read_all(&processed_dir.join(RATINGS_FILE))?,
        omdb_details,
    })
}

/// Validate and write `set`. Nothing is written when validation fails.
pub async fn load_set(store: &Store, set: &EntitySet, chunk_size: usize) -> Result<TableCounts> {
    set.validate()
        .context("Processed data failed integrity checks")?;

    let counts = store.replace_all(set, chunk_size).await?;
    for (table, rows) in counts.as_pairs() {
        metrics::gauge!("etl_rows_loaded", "table" => table).set(rows as f64);
    }

    Ok(counts)
}

pub async fn load(store: &Store, processed_dir: &Path, chunk_size: usize) -> Result<TableCounts> {
    info!(input = %processed_dir.display(), "Starting load");

    let set = read_processed(processed_dir)?;
    let counts = load_set(store, &set, chunk_size).await?;

    info!(%counts, "Load complete");
    Ok(counts)
}

pub async fn run(config: &Config) -> Result<TableCounts> {
    let store = Store::new(&config.general.database_path).await?;
    load(&store, &config.processed_dir(), config.load.insert_chunk_size).await
}
