use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub movielens: MovieLensConfig,

    pub omdb: OmdbConfig,

    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Root of the working data tree. Raw downloads land in `<data_dir>/raw`,
    /// transform output in `<data_dir>/processed`.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/movies.db".to_string(),
            log_level: "info".to_string(),
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieLensConfig {
    pub dataset_url: String,

    /// Directory name inside the archive (and the archive file stem).
    pub dataset_name: String,

    /// Request timeout for the archive download in seconds (default: 60)
    pub download_timeout_seconds: u32,
}

impl Default for MovieLensConfig {
    fn default() -> Self {
        Self {
            dataset_url: "https://files.grouplens.org/datasets/movielens/ml-latest-small.zip"
                .to_string(),
            dataset_name: "ml-latest-small".to_string(),
            download_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub base_url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Maximum number of successful lookups per extract run (default: 100).
    /// The free OMDb tier allows 1000 requests per day.
    pub limit: u32,

    pub max_retries: u32,

    /// Linear backoff unit; attempt `n` waits `n * backoff_ms` before retrying.
    pub backoff_ms: u64,

    pub request_timeout_seconds: u32,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com/".to_string(),
            api_key: String::new(),
            limit: 100,
            max_retries: 3,
            backoff_ms: 500,
            request_timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Rows per multi-row INSERT. SQLite caps bound variables per statement
    /// (999 on older builds); the widest table has 9 columns.
    pub insert_chunk_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            insert_chunk_size: 100,
        }
    }
}

impl Config {
    /// Load from the first config file found, then apply `.env` and
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load_from_search_paths()?,
        };

        dotenvy::dotenv().ok();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_from_search_paths() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides taken from the environment: `DATABASE_URL`, `OMDB_API_KEY`, `OMDB_LIMIT`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.general.database_path = url;
        }

        if let Some(key) = lookup("OMDB_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.omdb.api_key = key.trim().to_string();
        }

        if let Some(limit) = lookup("OMDB_LIMIT").and_then(|v| v.trim().parse().ok()) {
            self.omdb.limit = limit;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("movie-etl").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".movie-etl").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.load.insert_chunk_size == 0 {
            anyhow::bail!("load.insert_chunk_size must be > 0");
        }

        Ok(())
    }

    #[must_use]
    pub fn raw_dir(&self) -> PathBuf {
        Path::new(&self.general.data_dir).join("raw")
    }

    #[must_use]
    pub fn dataset_dir(&self) -> PathBuf {
        self.raw_dir().join(&self.movielens.dataset_name)
    }

    #[must_use]
    pub fn processed_dir(&self) -> PathBuf {
        Path::new(&self.general.data_dir).join("processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_path, "sqlite:data/movies.db");
        assert_eq!(config.omdb.limit, 100);
        assert_eq!(config.omdb.max_retries, 3);
        assert_eq!(config.load.insert_chunk_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[omdb]"));
        assert!(toml_str.contains("[load]"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [omdb]
            limit = 25
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.omdb.limit, 25);

        assert_eq!(config.omdb.base_url, "https://www.omdbapi.com/");
        assert_eq!(config.movielens.dataset_name, "ml-latest-small");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite:/tmp/other.db"),
            ("OMDB_API_KEY", " abc123 "),
            ("OMDB_LIMIT", "7"),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.general.database_path, "sqlite:/tmp/other.db");
        assert_eq!(config.omdb.api_key, "abc123");
        assert_eq!(config.omdb.limit, 7);
    }

    #[test]
    fn test_invalid_limit_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| (key == "OMDB_LIMIT").then(|| "lots".to_string()));
        assert_eq!(config.omdb.limit, 100);
    }

    #[test]
    fn test_derived_paths() {
        let mut config = Config::default();
        config.general.data_dir = "/srv/etl".to_string();
        assert_eq!(config.raw_dir(), PathBuf::from("/srv/etl/raw"));
        assert_eq!(
            config.dataset_dir(),
            PathBuf::from("/srv/etl/raw/ml-latest-small")
        );
        assert_eq!(config.processed_dir(), PathBuf::from("/srv/etl/processed"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::default();
        config.load.insert_chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
