use crate::config::OmdbConfig;
use crate::services::metadata::{LookupError, MetadataLookup};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// One OMDb record as returned by `?i=<imdb id>`. Only the fields the
/// pipeline persists are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,

    /// `"True"` or `"False"`.
    pub response: Option<String>,
    pub error: Option<String>,
}

impl OmdbMovie {
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self
            .response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("false"))
    }
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
    backoff: Duration,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> anyhow::Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("OMDb API key is not set (omdb.api_key or OMDB_API_KEY)");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    fn request_url(&self, external_id: &str) -> Result<Url, LookupError> {
        Url::parse_with_params(
            &self.base_url,
            &[("i", external_id), ("apikey", self.api_key.as_str())],
        )
        .map_err(|e| LookupError::Transport(format!("invalid OMDb URL: {e}")))
    }

    async fn fetch_once(&self, external_id: &str) -> Result<Option<OmdbMovie>, LookupError> {
        let url = self.request_url(external_id)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let movie: OmdbMovie = response.json().await?;
        if movie.is_found() {
            Ok(Some(movie))
        } else {
            debug!(external_id, error = ?movie.error, "OMDb has no record");
            Ok(None)
        }
    }
}

#[async_trait]
impl MetadataLookup for OmdbClient {
    async fn lookup(&self, external_id: &str) -> Result<Option<OmdbMovie>, LookupError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match self.fetch_once(external_id).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    warn!(external_id, attempt, error = %e, "OMDb request failed");
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(LookupError::RetriesExhausted {
            attempts: self.max_retries,
            last: last_error,
        })
    }
}
