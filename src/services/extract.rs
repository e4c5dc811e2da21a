//! Extract stage: MovieLens archive plus OMDb metadata for linked movies.

use crate::clients::omdb::OmdbMovie;
use crate::clients::{DatasetClient, OmdbClient};
use crate::config::Config;
use crate::models::{RawLink, RawMetadata};
use crate::parser;
use crate::reader;
use crate::services::metadata::MetadataLookup;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const METADATA_FILE: &str = "omdb_raw.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractReport {
    pub looked_up: u64,
    pub resolved: u64,
    pub absent: u64,
    pub failed: u64,
    pub skipped_invalid_ids: u64,
}

fn into_raw(movie: OmdbMovie, movie_id: &str, external_id: &str) -> RawMetadata {
    RawMetadata {
        movie_id: Some(movie_id.to_string()),
        imdb_id: movie.imdb_id.or_else(|| Some(external_id.to_string())),
        title: movie.title,
        director: movie.director,
        plot: movie.plot,
        box_office: movie.box_office,
        released: movie.released,
        runtime: movie.runtime,
        language: movie.language,
        country: movie.country,
    }
}

/// Look up links in file order, one request at a time, until `limit`
/// records have been resolved. Absences and failures are counted only.
pub async fn fetch_metadata<L>(
    lookup: &L,
    links: &[RawLink],
    limit: u32,
) -> (Vec<RawMetadata>, ExtractReport)
where
    L: MetadataLookup + ?Sized,
{
    let mut records = Vec::new();
    let mut report = ExtractReport::default();

    if limit == 0 {
        return (records, report);
    }

    for link in links {
        let Some(numeric) = parser::parse_numeric_external_id(&link.imdb_id) else {
            debug!(movie_id = %link.movie_id, imdb_id = %link.imdb_id, "Skipping link without usable id");
            report.skipped_invalid_ids += 1;
            continue;
        };
        if parser::parse_id(&link.movie_id).is_none() {
            report.skipped_invalid_ids += 1;
            continue;
        }

        let external_id = parser::to_canonical_external_id(numeric);
        report.looked_up += 1;

        match lookup.lookup(&external_id).await {
            Ok(Some(movie)) => {
                records.push(into_raw(movie, link.movie_id.trim(), &external_id));
                report.resolved += 1;
                if report.resolved >= u64::from(limit) {
                    break;
                }
            }
            Ok(None) => report.absent += 1,
            Err(e) => {
                warn!(external_id = %external_id, error = %e, "Metadata lookup failed");
                report.failed += 1;
            }
        }
    }

    (records, report)
}

/// Download the dataset, then fetch metadata for its links. Returns where
/// the metadata was written, if anything was resolved.
pub async fn run(config: &Config) -> Result<(Option<PathBuf>, ExtractReport)> {
    info!("Starting extract");

    let omdb = OmdbClient::new(&config.omdb)?;
    let dataset = DatasetClient::new(&config.movielens)?;
    let dataset_dir = dataset.fetch(&config.raw_dir()).await?;

    let links_path = dataset_dir.join("links.csv");
    let batch = reader::read_records::<RawLink>(&links_path)?;
    if !batch.unreadable.is_empty() {
        warn!(
            lines = batch.unreadable.len(),
            path = %links_path.display(),
            "Skipped unreadable link lines"
        );
    }

    let (records, report) = fetch_metadata(&omdb, &batch.records, config.omdb.limit).await;
    info!(
        looked_up = report.looked_up,
        resolved = report.resolved,
        absent = report.absent,
        failed = report.failed,
        skipped = report.skipped_invalid_ids,
        "Metadata lookups finished"
    );

    if records.is_empty() {
        info!("No OMDb records resolved; {} not written", METADATA_FILE);
        return Ok((None, report));
    }

    let out = dataset_dir.join(METADATA_FILE);
    reader::write_records(&out, &records)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!(path = %out.display(), rows = records.len(), "Wrote raw metadata");

    Ok((Some(out), report))
}
