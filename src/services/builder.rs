//! Folds normalized raw rows into the relational entity sets.
//!
//! Keys are held in ordered maps so the same input always yields the same
//! rows in the same order. Row-level problems are counted in a
//! [`BuildReport`]; structural problems surface from [`EntityBuilder::build`]
//! as an [`IntegrityError`].

use crate::entities::{genres, movie_genres, movies, omdb_details, ratings, users};
use crate::models::{EntitySet, IntegrityError, RawLink, RawMetadata, RawMovie, RawRating};
use crate::parser::{self, RowError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Counters surfaced at the end of a transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub movies_read: u64,
    pub movies_dropped: u64,
    pub movie_conflicts: u64,
    pub ratings_read: u64,
    pub ratings_out_of_range: u64,
    pub ratings_malformed: u64,
    pub duplicate_ratings: u64,
    pub links_read: u64,
    pub links_dropped: u64,
    pub metadata_read: u64,
    pub metadata_dropped: u64,
    pub metadata_conflicts: u64,
    pub unreadable_lines: u64,
}

impl BuildReport {
    /// Total rows excluded by the row-drop policy.
    #[must_use]
    pub const fn rows_dropped(&self) -> u64 {
        self.movies_dropped
            + self.ratings_out_of_range
            + self.ratings_malformed
            + self.links_dropped
            + self.metadata_dropped
            + self.unreadable_lines
    }

    pub fn log(&self) {
        info!(
            movies_read = self.movies_read,
            movies_dropped = self.movies_dropped,
            movie_conflicts = self.movie_conflicts,
            ratings_read = self.ratings_read,
            ratings_out_of_range = self.ratings_out_of_range,
            ratings_malformed = self.ratings_malformed,
            duplicate_ratings = self.duplicate_ratings,
            links_dropped = self.links_dropped,
            metadata_read = self.metadata_read,
            metadata_dropped = self.metadata_dropped,
            metadata_conflicts = self.metadata_conflicts,
            unreadable_lines = self.unreadable_lines,
            "Transform report"
        );

        let drops = [
            ("movies", "malformed", self.movies_dropped),
            ("ratings", "rating_out_of_range", self.ratings_out_of_range),
            ("ratings", "malformed", self.ratings_malformed),
            ("links", "malformed", self.links_dropped),
            ("omdb_details", "malformed", self.metadata_dropped),
            ("raw", "unreadable", self.unreadable_lines),
        ];
        for (entity, reason, count) in drops {
            metrics::counter!("etl_rows_dropped_total", "entity" => entity, "reason" => reason)
                .increment(count);
        }

        let conflicts = [
            ("movies", self.movie_conflicts),
            ("ratings", self.duplicate_ratings),
            ("omdb_details", self.metadata_conflicts),
        ];
        for (entity, count) in conflicts {
            metrics::counter!("etl_conflicts_total", "entity" => entity).increment(count);
        }
    }
}

#[derive(Debug, Default)]
pub struct EntityBuilder {
    movies: BTreeMap<i32, movies::Model>,
    movie_genres: BTreeSet<(i32, String)>,
    users: BTreeSet<i32>,
    ratings: BTreeMap<(i32, i32, i64), f64>,
    links: BTreeMap<i32, String>,
    metadata: BTreeMap<i32, omdb_details::Model>,
    report: BuildReport,
}

impl EntityBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Count lines the reader could not decode into a raw row.
    pub fn record_unreadable(&mut self, lines: usize) {
        self.report.unreadable_lines += lines as u64;
    }

    pub fn add_movie(&mut self, raw: &RawMovie) {
        self.report.movies_read += 1;

        let Some(movie_id) = parser::parse_id(&raw.movie_id) else {
            debug!(value = %raw.movie_id, "Dropping movie row with malformed id");
            self.report.movies_dropped += 1;
            return;
        };

        if let Some(existing) = self.movies.get(&movie_id) {
            if existing.title != raw.title {
                warn!(
                    movie_id,
                    kept = %existing.title,
                    ignored = %raw.title,
                    "Conflicting duplicate movie row; keeping first"
                );
                self.report.movie_conflicts += 1;
            }
            return;
        }

        self.movies.insert(
            movie_id,
            movies::Model {
                movie_id,
                title: raw.title.clone(),
                year: parser::extract_year(&raw.title),
            },
        );

        for genre in parser::split_genres(&raw.genres) {
            self.movie_genres.insert((movie_id, genre));
        }
    }

    pub fn add_rating(&mut self, raw: &RawRating) {
        self.report.ratings_read += 1;

        // A user exists once any of their rows names them, even if the
        // rating itself is dropped.
        if let Some(user_id) = parser::parse_id(&raw.user_id) {
            self.users.insert(user_id);
        }

        match Self::parse_rating_row(raw) {
            Ok((user_id, movie_id, rating, timestamp)) => {
                let key = (user_id, movie_id, timestamp);
                if self.ratings.contains_key(&key) {
                    debug!(?key, "Duplicate rating key; keeping first");
                    self.report.duplicate_ratings += 1;
                } else {
                    self.ratings.insert(key, rating);
                }
            }
            Err(RowError::RatingOutOfRange(value)) => {
                debug!(value, user_id = %raw.user_id, movie_id = %raw.movie_id, "Dropping out-of-range rating");
                self.report.ratings_out_of_range += 1;
            }
            Err(e) => {
                debug!(error = %e, "Dropping malformed rating row");
                self.report.ratings_malformed += 1;
            }
        }
    }

    fn parse_rating_row(raw: &RawRating) -> Result<(i32, i32, f64, i64), RowError> {
        let user_id = parser::parse_id(&raw.user_id).ok_or_else(|| RowError::MalformedId {
            field: "userId",
            value: raw.user_id.clone(),
        })?;
        let movie_id = parser::parse_id(&raw.movie_id).ok_or_else(|| RowError::MalformedId {
            field: "movieId",
            value: raw.movie_id.clone(),
        })?;
        let timestamp = parser::normalize_timestamp(&raw.timestamp)?;
        let rating = parser::parse_rating(&raw.rating)?;
        Ok((user_id, movie_id, rating, timestamp))
    }

    /// Register the external id a movie maps to. Used when a metadata row
    /// carries no id of its own.
    pub fn add_link(&mut self, raw: &RawLink) {
        self.report.links_read += 1;

        let movie_id = parser::parse_id(&raw.movie_id);
        let numeric = parser::parse_numeric_external_id(&raw.imdb_id);
        match (movie_id, numeric) {
            (Some(movie_id), Some(numeric)) => {
                self.links
                    .entry(movie_id)
                    .or_insert_with(|| parser::to_canonical_external_id(numeric));
            }
            _ => {
                debug!(movie_id = %raw.movie_id, imdb_id = %raw.imdb_id, "Dropping malformed link row");
                self.report.links_dropped += 1;
            }
        }
    }

    pub fn add_metadata(&mut self, raw: &RawMetadata) {
        self.report.metadata_read += 1;

        let Some(movie_id) = raw.movie_id.as_deref().and_then(parser::parse_id) else {
            debug!(value = ?raw.movie_id, "Dropping metadata row without a movie id");
            self.report.metadata_dropped += 1;
            return;
        };

        if self.metadata.contains_key(&movie_id) {
            warn!(movie_id, "Duplicate metadata row; keeping first");
            self.report.metadata_conflicts += 1;
            return;
        }

        self.metadata.insert(
            movie_id,
            omdb_details::Model {
                movie_id,
                imdb_id: parser::clean_text(raw.imdb_id.as_deref()),
                director: parser::clean_text(raw.director.as_deref()),
                plot: parser::clean_text(raw.plot.as_deref()),
                box_office: parser::parse_box_office(raw.box_office.as_deref()),
                released_date: parser::parse_released_date(raw.released.as_deref()),
                runtime_minutes: parser::parse_runtime(raw.runtime.as_deref()),
                language: parser::clean_text(raw.language.as_deref()),
                country: parser::clean_text(raw.country.as_deref()),
            },
        );
    }

    /// Materialize the entity sets and verify them as a whole.
    pub fn build(self) -> Result<(EntitySet, BuildReport), IntegrityError> {
        let Self {
            movies,
            movie_genres,
            users,
            ratings,
            links,
            metadata,
            report,
        } = self;

        let genre_names: BTreeSet<&str> = movie_genres.iter().map(|(_, g)| g.as_str()).collect();

        let set = EntitySet {
            genres: genre_names
                .into_iter()
                .map(|genre| genres::Model {
                    genre: genre.to_string(),
                })
                .collect(),
            movie_genres: movie_genres
                .iter()
                .map(|(movie_id, genre)| movie_genres::Model {
                    movie_id: *movie_id,
                    genre: genre.clone(),
                })
                .collect(),
            movies: movies.into_values().collect(),
            users: users
                .into_iter()
                .map(|user_id| users::Model { user_id })
                .collect(),
            ratings: ratings
                .into_iter()
                .map(|((user_id, movie_id, rating_timestamp), rating)| ratings::Model {
                    user_id,
                    movie_id,
                    rating,
                    rating_timestamp,
                })
                .collect(),
            omdb_details: metadata
                .into_values()
                .map(|mut detail| {
                    if detail.imdb_id.is_none() {
                        detail.imdb_id = links.get(&detail.movie_id).cloned();
                    }
                    detail
                })
                .collect(),
        };

        set.validate()?;
        Ok((set, report))
    }
}
