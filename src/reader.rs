//! CSV access for raw and processed files.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Records decoded from one file plus the lines that could not be decoded.
#[derive(Debug)]
pub struct CsvBatch<T> {
    pub records: Vec<T>,
    pub unreadable: Vec<UnreadableLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableLine {
    pub line: u64,
    pub error: String,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

/// Decode every line; lines the CSV layer rejects are collected rather than
/// failing the whole file.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<CsvBatch<T>> {
    let mut reader = open(path)?;
    let mut records = Vec::new();
    let mut unreadable = Vec::new();

    for (index, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                let line = e
                    .position()
                    .map_or(index as u64 + 2, csv::Position::line);
                debug!(path = %path.display(), line, error = %e, "Skipping unreadable line");
                unreadable.push(UnreadableLine {
                    line,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(CsvBatch {
        records,
        unreadable,
    })
}

/// Decode every line, failing on the first one that does not fit `T`.
/// Used for files this crate wrote itself.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = open(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        let record =
            result.with_context(|| format!("Malformed record in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = open(path)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?;
    Ok(headers.iter().map(str::to_string).collect())
}

pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
