use crate::entities::{genres, movie_genres, movies, omdb_details, ratings, users};
use crate::parser::rating::{MAX_RATING, MIN_RATING};
use crate::parser::title::{MAX_YEAR, MIN_YEAR};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Structural problems that fail a run. Each variant names the offending
/// entity and key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    #[error("{entity} row references unknown movie {movie_id}")]
    UnknownMovie {
        entity: &'static str,
        movie_id: i32,
    },

    #[error("{entity} row references unknown user {user_id}")]
    UnknownUser {
        entity: &'static str,
        user_id: i32,
    },

    #[error("{entity} row references unknown genre '{genre}'")]
    UnknownGenre {
        entity: &'static str,
        genre: String,
    },

    #[error("external id {external_id} is claimed by movies {first} and {second}")]
    DuplicateExternalId {
        external_id: String,
        first: i32,
        second: i32,
    },

    #[error("duplicate primary key in {entity}: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("{entity} {key}: {field} value {value} out of range")]
    OutOfRange {
        entity: &'static str,
        key: String,
        field: &'static str,
        value: String,
    },
}

/// The six relational entity sets produced by one run, in insert order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySet {
    pub movies: Vec<movies::Model>,
    pub genres: Vec<genres::Model>,
    pub movie_genres: Vec<movie_genres::Model>,
    pub users: Vec<users::Model>,
    pub ratings: Vec<ratings::Model>,
    pub omdb_details: Vec<omdb_details::Model>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub movies: u64,
    pub genres: u64,
    pub movie_genres: u64,
    pub users: u64,
    pub ratings: u64,
    pub omdb_details: u64,
}

impl TableCounts {
    /// `(table, rows)` pairs in insert order.
    #[must_use]
    pub const fn as_pairs(&self) -> [(&'static str, u64); 6] {
        [
            ("movies", self.movies),
            ("genres", self.genres),
            ("movie_genres", self.movie_genres),
            ("users", self.users),
            ("ratings", self.ratings),
            ("omdb_details", self.omdb_details),
        ]
    }
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .as_pairs()
            .iter()
            .map(|(table, rows)| format!("{table}={rows}"))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl EntitySet {
    #[must_use]
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            movies: self.movies.len() as u64,
            genres: self.genres.len() as u64,
            movie_genres: self.movie_genres.len() as u64,
            users: self.users.len() as u64,
            ratings: self.ratings.len() as u64,
            omdb_details: self.omdb_details.len() as u64,
        }
    }

    /// Check every key, range, and reference invariant before anything is
    /// written. Returns the first violation found.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        let mut movie_ids = HashSet::with_capacity(self.movies.len());
        for movie in &self.movies {
            if !movie_ids.insert(movie.movie_id) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "movies",
                    key: movie.movie_id.to_string(),
                });
            }
            if let Some(year) = movie.year {
                if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                    return Err(IntegrityError::OutOfRange {
                        entity: "movies",
                        key: movie.movie_id.to_string(),
                        field: "year",
                        value: year.to_string(),
                    });
                }
            }
        }

        let mut genre_names = HashSet::with_capacity(self.genres.len());
        for genre in &self.genres {
            if !genre_names.insert(genre.genre.as_str()) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "genres",
                    key: genre.genre.clone(),
                });
            }
        }

        let mut links = HashSet::with_capacity(self.movie_genres.len());
        for link in &self.movie_genres {
            if !movie_ids.contains(&link.movie_id) {
                return Err(IntegrityError::UnknownMovie {
                    entity: "movie_genres",
                    movie_id: link.movie_id,
                });
            }
            if !genre_names.contains(link.genre.as_str()) {
                return Err(IntegrityError::UnknownGenre {
                    entity: "movie_genres",
                    genre: link.genre.clone(),
                });
            }
            if !links.insert((link.movie_id, link.genre.as_str())) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "movie_genres",
                    key: format!("({}, {})", link.movie_id, link.genre),
                });
            }
        }

        let mut user_ids = HashSet::with_capacity(self.users.len());
        for user in &self.users {
            if !user_ids.insert(user.user_id) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "users",
                    key: user.user_id.to_string(),
                });
            }
        }

        let mut rating_keys = HashSet::with_capacity(self.ratings.len());
        for rating in &self.ratings {
            let key = (rating.user_id, rating.movie_id, rating.rating_timestamp);
            if !movie_ids.contains(&rating.movie_id) {
                return Err(IntegrityError::UnknownMovie {
                    entity: "ratings",
                    movie_id: rating.movie_id,
                });
            }
            if !user_ids.contains(&rating.user_id) {
                return Err(IntegrityError::UnknownUser {
                    entity: "ratings",
                    user_id: rating.user_id,
                });
            }
            if !(MIN_RATING..=MAX_RATING).contains(&rating.rating) {
                return Err(IntegrityError::OutOfRange {
                    entity: "ratings",
                    key: format!("{key:?}"),
                    field: "rating",
                    value: rating.rating.to_string(),
                });
            }
            if !rating_keys.insert(key) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "ratings",
                    key: format!("{key:?}"),
                });
            }
        }

        let mut detail_ids = HashSet::with_capacity(self.omdb_details.len());
        let mut external_ids: HashMap<&str, i32> = HashMap::new();
        for detail in &self.omdb_details {
            if !movie_ids.contains(&detail.movie_id) {
                return Err(IntegrityError::UnknownMovie {
                    entity: "omdb_details",
                    movie_id: detail.movie_id,
                });
            }
            if !detail_ids.insert(detail.movie_id) {
                return Err(IntegrityError::DuplicateKey {
                    entity: "omdb_details",
                    key: detail.movie_id.to_string(),
                });
            }
            if let Some(external_id) = detail.imdb_id.as_deref() {
                if let Some(first) = external_ids.insert(external_id, detail.movie_id) {
                    return Err(IntegrityError::DuplicateExternalId {
                        external_id: external_id.to_string(),
                        first,
                        second: detail.movie_id,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32) -> movies::Model {
        movies::Model {
            movie_id: id,
            title: format!("Movie {id} (1999)"),
            year: Some(1999),
        }
    }

    fn detail(movie_id: i32, imdb_id: &str) -> omdb_details::Model {
        omdb_details::Model {
            movie_id,
            imdb_id: Some(imdb_id.to_string()),
            director: None,
            plot: None,
            box_office: None,
            released_date: None,
            runtime_minutes: None,
            language: None,
            country: None,
        }
    }

    fn valid_set() -> EntitySet {
        EntitySet {
            movies: vec![movie(1), movie(2)],
            genres: vec![genres::Model {
                genre: "Drama".to_string(),
            }],
            movie_genres: vec![movie_genres::Model {
                movie_id: 1,
                genre: "Drama".to_string(),
            }],
            users: vec![users::Model { user_id: 10 }],
            ratings: vec![ratings::Model {
                user_id: 10,
                movie_id: 2,
                rating: 4.5,
                rating_timestamp: 1_000,
            }],
            omdb_details: vec![detail(1, "tt0000001")],
        }
    }

    #[test]
    fn valid_set_passes() {
        let set = valid_set();
        assert_eq!(set.validate(), Ok(()));
        assert_eq!(set.counts().ratings, 1);
        assert_eq!(
            set.counts().to_string(),
            "movies=2 genres=1 movie_genres=1 users=1 ratings=1 omdb_details=1"
        );
    }

    #[test]
    fn rating_for_unknown_movie_fails() {
        let mut set = valid_set();
        set.ratings[0].movie_id = 99;
        assert_eq!(
            set.validate(),
            Err(IntegrityError::UnknownMovie {
                entity: "ratings",
                movie_id: 99
            })
        );
    }

    #[test]
    fn rating_for_unknown_user_fails() {
        let mut set = valid_set();
        set.ratings[0].user_id = 11;
        assert!(matches!(
            set.validate(),
            Err(IntegrityError::UnknownUser { user_id: 11, .. })
        ));
    }

    #[test]
    fn movie_genre_for_unknown_genre_fails() {
        let mut set = valid_set();
        set.movie_genres[0].genre = "Western".to_string();
        assert!(matches!(
            set.validate(),
            Err(IntegrityError::UnknownGenre { .. })
        ));
    }

    #[test]
    fn out_of_range_rating_fails() {
        let mut set = valid_set();
        set.ratings[0].rating = 5.5;
        assert!(matches!(
            set.validate(),
            Err(IntegrityError::OutOfRange { field: "rating", .. })
        ));
    }

    #[test]
    fn out_of_range_year_fails() {
        let mut set = valid_set();
        set.movies[0].year = Some(1600);
        assert!(matches!(
            set.validate(),
            Err(IntegrityError::OutOfRange { field: "year", .. })
        ));
    }

    #[test]
    fn duplicate_external_id_fails() {
        let mut set = valid_set();
        set.omdb_details.push(detail(2, "tt0000001"));
        assert_eq!(
            set.validate(),
            Err(IntegrityError::DuplicateExternalId {
                external_id: "tt0000001".to_string(),
                first: 1,
                second: 2,
            })
        );
    }

    #[test]
    fn duplicate_rating_key_fails() {
        let mut set = valid_set();
        let again = set.ratings[0].clone();
        set.ratings.push(again);
        assert!(matches!(
            set.validate(),
            Err(IntegrityError::DuplicateKey {
                entity: "ratings",
                ..
            })
        ));
    }
}
