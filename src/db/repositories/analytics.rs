use crate::entities::prelude::*;
use crate::models::TableCounts;
use anyhow::Result;
use sea_orm::{
    DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, Statement,
};
use serde::Serialize;

/// Read-only aggregate queries over a loaded store.
pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct MovieAverage {
    pub movie_id: i32,
    pub title: String,
    pub average_rating: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct DirectorCount {
    pub director: String,
    pub movie_count: i64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct GenreAverage {
    pub genre: String,
    pub average_rating: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct YearAverage {
    pub year: i32,
    pub average_rating: f64,
    pub rating_count: i64,
}

const TOP_RATED_MOVIES: &str = r"
WITH averages AS (
    SELECT m.movie_id, m.title, AVG(r.rating) AS average_rating, COUNT(*) AS rating_count
    FROM movies m
    JOIN ratings r ON r.movie_id = m.movie_id
    GROUP BY m.movie_id, m.title
    HAVING COUNT(*) >= ?
),
ranked AS (
    SELECT movie_id, title, average_rating, rating_count,
           RANK() OVER (ORDER BY average_rating DESC) AS position
    FROM averages
)
SELECT movie_id, title, average_rating, rating_count
FROM ranked
WHERE position = 1
ORDER BY movie_id";

const MOST_PROLIFIC_DIRECTORS: &str = r"
WITH counts AS (
    SELECT director, COUNT(*) AS movie_count
    FROM omdb_details
    WHERE director IS NOT NULL
    GROUP BY director
),
ranked AS (
    SELECT director, movie_count,
           RANK() OVER (ORDER BY movie_count DESC) AS position
    FROM counts
)
SELECT director, movie_count
FROM ranked
WHERE position = 1
ORDER BY director";

const TOP_GENRES_BY_AVERAGE: &str = r"
SELECT mg.genre AS genre, AVG(r.rating) AS average_rating, COUNT(*) AS rating_count
FROM movie_genres mg
JOIN ratings r ON r.movie_id = mg.movie_id
GROUP BY mg.genre
ORDER BY average_rating DESC, mg.genre ASC
LIMIT ?";

const AVERAGE_RATING_BY_YEAR: &str = r"
SELECT m.year AS year, AVG(r.rating) AS average_rating, COUNT(*) AS rating_count
FROM movies m
JOIN ratings r ON r.movie_id = m.movie_id
WHERE m.year IS NOT NULL
GROUP BY m.year
ORDER BY m.year";

impl AnalyticsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Every movie tied for the highest average, among movies with at least
    /// `min_ratings` ratings.
    pub async fn top_rated_movies(&self, min_ratings: u32) -> Result<Vec<MovieAverage>> {
        let rows = MovieAverage::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            TOP_RATED_MOVIES,
            [i64::from(min_ratings).into()],
        ))
        .all(&self.conn)
        .await?;

        Ok(rows)
    }

    /// Directors credited on the most movies, ties included.
    pub async fn most_prolific_directors(&self) -> Result<Vec<DirectorCount>> {
        let rows = DirectorCount::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            MOST_PROLIFIC_DIRECTORS,
        ))
        .all(&self.conn)
        .await?;

        Ok(rows)
    }

    pub async fn top_genres_by_average(&self, limit: u32) -> Result<Vec<GenreAverage>> {
        let rows = GenreAverage::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            TOP_GENRES_BY_AVERAGE,
            [i64::from(limit).into()],
        ))
        .all(&self.conn)
        .await?;

        Ok(rows)
    }

    pub async fn average_rating_by_year(&self) -> Result<Vec<YearAverage>> {
        let rows = YearAverage::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            AVERAGE_RATING_BY_YEAR,
        ))
        .all(&self.conn)
        .await?;

        Ok(rows)
    }

    pub async fn table_counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            movies: Movies::find().count(&self.conn).await?,
            genres: Genres::find().count(&self.conn).await?,
            movie_genres: MovieGenres::find().count(&self.conn).await?,
            users: Users::find().count(&self.conn).await?,
            ratings: Ratings::find().count(&self.conn).await?,
            omdb_details: OmdbDetails::find().count(&self.conn).await?,
        })
    }
}
