//! Row shapes of the raw input files.
//!
//! Numeric columns are kept as text here; the parsers decide what a
//! malformed value means for the row.

use serde::{Deserialize, Serialize};

/// `movies.csv`: `movieId,title,genres`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawMovie {
    #[serde(rename = "movieId")]
    pub movie_id: String,

    pub title: String,

    #[serde(default)]
    pub genres: String,
}

/// `ratings.csv`: `userId,movieId,rating,timestamp`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRating {
    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "movieId")]
    pub movie_id: String,

    pub rating: String,

    pub timestamp: String,
}

/// `links.csv`: `movieId,imdbId,tmdbId`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawLink {
    #[serde(rename = "movieId")]
    pub movie_id: String,

    #[serde(rename = "imdbId", default)]
    pub imdb_id: String,

    #[serde(rename = "tmdbId", default)]
    pub tmdb_id: Option<String>,
}

/// `omdb_raw.csv`, one resolved OMDb payload per row tagged with the
/// MovieLens id it was fetched for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RawMetadata {
    #[serde(rename = "_movieId")]
    pub movie_id: Option<String>,

    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,

    #[serde(rename = "Title")]
    pub title: Option<String>,

    #[serde(rename = "Director")]
    pub director: Option<String>,

    #[serde(rename = "Plot")]
    pub plot: Option<String>,

    #[serde(rename = "BoxOffice")]
    pub box_office: Option<String>,

    #[serde(rename = "Released")]
    pub released: Option<String>,

    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,

    #[serde(rename = "Language")]
    pub language: Option<String>,

    #[serde(rename = "Country")]
    pub country: Option<String>,
}

impl RawMetadata {
    /// Header that marks a metadata file as carrying MovieLens ids.
    pub const MOVIE_ID_COLUMN: &'static str = "_movieId";
}
