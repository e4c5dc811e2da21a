//! Transform stage: raw MovieLens/OMDb files in, six processed tables out.

use crate::config::Config;
use crate::models::{EntitySet, RawLink, RawMetadata, RawMovie, RawRating};
use crate::reader;
use crate::services::builder::{BuildReport, EntityBuilder};
use crate::services::extract::METADATA_FILE;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

pub const MOVIES_FILE: &str = "movies.csv";
pub const GENRES_FILE: &str = "genres.csv";
pub const MOVIE_GENRES_FILE: &str = "movie_genres.csv";
pub const USERS_FILE: &str = "users.csv";
pub const RATINGS_FILE: &str = "ratings.csv";
pub const OMDB_DETAILS_FILE: &str = "omdb_details.csv";

fn read_raw<T: serde::de::DeserializeOwned>(
    builder: &mut EntityBuilder,
    path: &Path,
) -> Result<Vec<T>> {
    let batch = reader::read_records::<T>(path)?;
    if !batch.unreadable.is_empty() {
        warn!(
            path = %path.display(),
            lines = batch.unreadable.len(),
            first = batch.unreadable[0].line,
            "Skipped unreadable lines"
        );
        builder.record_unreadable(batch.unreadable.len());
    }
    Ok(batch.records)
}

/// Metadata rows, or `None` when the file is absent or was not produced by
/// the extract stage.
fn read_metadata(builder: &mut EntityBuilder, path: &Path) -> Result<Option<Vec<RawMetadata>>> {
    if !path.exists() {
        info!(path = %path.display(), "No metadata file; skipping OMDb transform");
        return Ok(None);
    }

    let headers = reader::read_headers(path)?;
    if !headers.iter().any(|h| h == RawMetadata::MOVIE_ID_COLUMN) {
        warn!(
            path = %path.display(),
            "Metadata file has no {} column; skipping OMDb transform",
            RawMetadata::MOVIE_ID_COLUMN
        );
        return Ok(None);
    }

    read_raw(builder, path).map(Some)
}

/// Build the entity sets from the raw files in `dataset_dir`.
pub fn build_from_dir(dataset_dir: &Path) -> Result<(EntitySet, BuildReport)> {
    let mut builder = EntityBuilder::new();

    let movies: Vec<RawMovie> = read_raw(&mut builder, &dataset_dir.join("movies.csv"))?;
    for row in &movies {
        builder.add_movie(row);
    }

    let ratings: Vec<RawRating> = read_raw(&mut builder, &dataset_dir.join("ratings.csv"))?;
    for row in &ratings {
        builder.add_rating(row);
    }

    let links_path = dataset_dir.join("links.csv");
    if links_path.exists() {
        let links: Vec<RawLink> = read_raw(&mut builder, &links_path)?;
        for row in &links {
            builder.add_link(row);
        }
    }

    if let Some(metadata) = read_metadata(&mut builder, &dataset_dir.join(METADATA_FILE))? {
        for row in &metadata {
            builder.add_metadata(row);
        }
    }

    let (set, report) = builder.build().context("Entity set failed integrity checks")?;
    Ok((set, report))
}

pub fn write_processed(set: &EntitySet, processed_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(processed_dir)
        .with_context(|| format!("Failed to create {}", processed_dir.display()))?;

    reader::write_records(&processed_dir.join(MOVIES_FILE), &set.movies)?;
    reader::write_records(&processed_dir.join(GENRES_FILE), &set.genres)?;
    reader::write_records(&processed_dir.join(MOVIE_GENRES_FILE), &set.movie_genres)?;
    reader::write_records(&processed_dir.join(USERS_FILE), &set.users)?;
    reader::write_records(&processed_dir.join(RATINGS_FILE), &set.ratings)?;

    let details = processed_dir.join(OMDB_DETAILS_FILE);
    if set.omdb_details.is_empty() {
        // A stale file from an earlier run would otherwise be loaded.
        if details.exists() {
            std::fs::remove_file(&details)
                .with_context(|| format!("Failed to remove {}", details.display()))?;
        }
    } else {
        reader::write_records(&details, &set.omdb_details)?;
    }

    Ok(())
}

/// Raw files to processed files. Fails without writing anything when the
/// entity sets are inconsistent.
pub fn transform(dataset_dir: &Path, processed_dir: &Path) -> Result<(EntitySet, BuildReport)> {
    info!(
        input = %dataset_dir.display(),
        output = %processed_dir.display(),
        "Starting transform"
    );

    let (set, report) = build_from_dir(dataset_dir)?;
    report.log();

    write_processed(&set, processed_dir)?;
    info!(counts = %set.counts(), "Transform complete");

    Ok((set, report))
}

pub async fn run(config: &Config) -> Result<BuildReport> {
    let dataset_dir = config.dataset_dir();
    let processed_dir = config.processed_dir();

    let (_, report) =
        tokio::task::spawn_blocking(move || transform(&dataset_dir, &processed_dir))
            .await
            .context("Transform task panicked")??;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "movie-etl-transform-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_dataset(dir: &Path) {
        std::fs::write(
            dir.join("movies.csv"),
            "movieId,title,genres\n1,Toy Story (1995),Adventure|Animation\n2,Jumanji (1995),Adventure|(no genres listed)\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("ratings.csv"),
            "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,2,5.5,964981247\n2,2,3.5,964982224\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("links.csv"),
            "movieId,imdbId,tmdbId\n1,0114709,862\n2,0113497,8844\n",
        )
        .unwrap();
    }

    #[test]
    fn test_transform_without_metadata() {
        let dir = scratch_dir("plain");
        write_dataset(&dir);
        let out = dir.join("processed");

        let (set, report) = transform(&dir, &out).unwrap();

        assert_eq!(set.counts().movies, 2);
        assert_eq!(set.counts().genres, 2);
        assert_eq!(set.counts().ratings, 2);
        assert_eq!(report.ratings_out_of_range, 1);
        assert!(out.join(MOVIES_FILE).exists());
        assert!(!out.join(OMDB_DETAILS_FILE).exists());

        let header = std::fs::read_to_string(out.join(RATINGS_FILE)).unwrap();
        assert!(header.starts_with("user_id,movie_id,rating,rating_timestamp\n"));
    }

    #[test]
    fn test_metadata_without_movie_id_column_is_skipped() {
        let dir = scratch_dir("nocol");
        write_dataset(&dir);
        std::fs::write(
            dir.join(METADATA_FILE),
            "imdbID,Director\ntt0114709,John Lasseter\n",
        )
        .unwrap();

        let (set, _) = build_from_dir(&dir).unwrap();
        assert!(set.omdb_details.is_empty());
    }

    #[test]
    fn test_metadata_is_joined() {
        let dir = scratch_dir("omdb");
        write_dataset(&dir);
        std::fs::write(
            dir.join(METADATA_FILE),
            "_movieId,imdbID,Title,Director,Plot,BoxOffice,Released,Runtime,Language,Country\n\
             1,tt0114709,Toy Story,John Lasseter,N/A,\"$223,225,679\",22 Nov 1995,81 min,English,United States\n",
        )
        .unwrap();

        let (set, _) = build_from_dir(&dir).unwrap();
        let detail = &set.omdb_details[0];
        assert_eq!(detail.movie_id, 1);
        assert_eq!(detail.plot, None);
        assert_eq!(detail.box_office, Some(223_225_679));
        assert_eq!(detail.released_date.as_deref(), Some("1995-11-22"));
    }

    #[test]
    fn test_integrity_failure_writes_nothing() {
        let dir = scratch_dir("broken");
        write_dataset(&dir);
        std::fs::write(
            dir.join("ratings.csv"),
            "userId,movieId,rating,timestamp\n1,99,4.0,964982703\n",
        )
        .unwrap();
        let out = dir.join("processed");

        let err = transform(&dir, &out).unwrap_err();
        assert!(format!("{err:#}").contains("unknown movie 99"));
        assert!(!out.exists());
    }
}
