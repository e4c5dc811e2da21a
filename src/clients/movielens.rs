use crate::config::MovieLensConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Files every MovieLens dataset directory must contain.
pub const REQUIRED_FILES: [&str; 3] = ["movies.csv", "ratings.csv", "links.csv"];

pub struct DatasetClient {
    client: Client,
    dataset_url: String,
    dataset_name: String,
}

impl DatasetClient {
    pub fn new(config: &MovieLensConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.download_timeout_seconds)))
            .build()?;

        Ok(Self {
            client,
            dataset_url: config.dataset_url.clone(),
            dataset_name: config.dataset_name.clone(),
        })
    }

    /// Download and unpack the dataset under `raw_dir`, skipping either step
    /// when its output already exists. Returns the dataset directory.
    pub async fn fetch(&self, raw_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(raw_dir)
            .await
            .with_context(|| format!("Failed to create {}", raw_dir.display()))?;

        let zip_path = raw_dir.join(format!("{}.zip", self.dataset_name));
        let dataset_dir = raw_dir.join(&self.dataset_name);

        if zip_path.exists() {
            info!(path = %zip_path.display(), "Dataset archive already present");
        } else if !dataset_dir.exists() {
            self.download(&zip_path).await?;
        }

        if dataset_dir.exists() {
            info!(path = %dataset_dir.display(), "Dataset already extracted");
        } else {
            let archive = zip_path.clone();
            let dest = raw_dir.to_path_buf();
            tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
                .await
                .context("Archive extraction task panicked")??;
        }

        verify_dataset(&dataset_dir)?;
        Ok(dataset_dir)
    }

    async fn download(&self, dest: &Path) -> Result<()> {
        info!(url = %self.dataset_url, "Downloading MovieLens dataset");

        let response = self
            .client
            .get(&self.dataset_url)
            .send()
            .await
            .context("Dataset download failed")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("Dataset download error: {}", status));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        info!(path = %dest.display(), bytes = bytes.len(), "Dataset archive saved");
        Ok(())
    }
}

pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive)
        .with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Not a zip archive: {}", archive.display()))?;

    zip.extract(dest)
        .with_context(|| format!("Failed to extract into {}", dest.display()))?;

    info!(entries = zip.len(), dest = %dest.display(), "Dataset archive extracted");
    Ok(())
}

/// Fails with the list of required files that are missing.
pub fn verify_dataset(dataset_dir: &Path) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_FILES
        .iter()
        .copied()
        .filter(|name| !dataset_dir.join(name).is_file())
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "Dataset at {} is missing: {}",
            dataset_dir.display(),
            missing.join(", ")
        );
    }
    Ok(())
}
