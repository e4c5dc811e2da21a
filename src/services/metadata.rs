//! The external metadata capability consumed by the extract stage.

use crate::clients::omdb::OmdbMovie;
use async_trait::async_trait;
use thiserror::Error;

/// Failures from a metadata source. None of these are fatal to a run; the
/// affected movie simply gets no metadata row.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Metadata source returned HTTP {0}")]
    Status(u16),

    #[error("Failed to decode metadata response: {0}")]
    Decode(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl LookupError {
    /// Whether another attempt could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Decode(_) | Self::RetriesExhausted { .. } => false,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Maps an external identifier (`tt0114709`) to its metadata record.
/// `Ok(None)` means the source has no record for the id.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, external_id: &str) -> Result<Option<OmdbMovie>, LookupError>;
}
