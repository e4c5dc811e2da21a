use crate::entities::{genres, movie_genres, movies, omdb_details, prelude::*, ratings, users};
use crate::models::{EntitySet, TableCounts};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    TransactionTrait,
};
use tracing::{debug, info};

/// Full-refresh writes. The whole store is replaced in one transaction.
pub struct RefreshRepository {
    conn: DatabaseConnection,
}

/// Insert `models` in multi-row statements of at most `chunk_size` rows.
async fn insert_chunked<E, A, C>(
    conn: &C,
    models: Vec<A>,
    chunk_size: usize,
    table: &'static str,
) -> Result<u64>
where
    E: EntityTrait,
    A: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let mut inserted = 0u64;
    let mut rows = models.into_iter();

    loop {
        let batch: Vec<A> = rows.by_ref().take(chunk_size.max(1)).collect();
        if batch.is_empty() {
            break;
        }

        let len = batch.len() as u64;
        E::insert_many(batch)
            .exec_without_returning(conn)
            .await
            .with_context(|| format!("Failed to insert into {table}"))?;
        inserted += len;
    }

    debug!(table, rows = inserted, "Inserted");
    Ok(inserted)
}

fn active<M, A>(models: &[M]) -> Vec<A>
where
    M: IntoActiveModel<A> + Clone,
    A: ActiveModelTrait,
{
    models.iter().cloned().map(IntoActiveModel::into_active_model).collect()
}

impl RefreshRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Clear all six tables and insert `set` in dependency order. Any error
    /// drops the transaction uncommitted, leaving the previous contents.
    pub async fn replace_all(&self, set: &EntitySet, chunk_size: usize) -> Result<TableCounts> {
        let txn = self.conn.begin().await?;

        // Children before parents.
        Ratings::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear ratings")?;
        MovieGenres::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear movie_genres")?;
        OmdbDetails::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear omdb_details")?;
        Users::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear users")?;
        Genres::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear genres")?;
        Movies::delete_many()
            .exec(&txn)
            .await
            .context("Failed to clear movies")?;

        let counts = TableCounts {
            movies: insert_chunked(
                &txn,
                active::<movies::Model, movies::ActiveModel>(&set.movies),
                chunk_size,
                "movies",
            )
            .await?,
            genres: insert_chunked(
                &txn,
                active::<genres::Model, genres::ActiveModel>(&set.genres),
                chunk_size,
                "genres",
            )
            .await?,
            movie_genres: insert_chunked(
                &txn,
                active::<movie_genres::Model, movie_genres::ActiveModel>(&set.movie_genres),
                chunk_size,
                "movie_genres",
            )
            .await?,
            users: insert_chunked(
                &txn,
                active::<users::Model, users::ActiveModel>(&set.users),
                chunk_size,
                "users",
            )
            .await?,
            ratings: insert_chunked(
                &txn,
                active::<ratings::Model, ratings::ActiveModel>(&set.ratings),
                chunk_size,
                "ratings",
            )
            .await?,
            omdb_details: insert_chunked(
                &txn,
                active::<omdb_details::Model, omdb_details::ActiveModel>(&set.omdb_details),
                chunk_size,
                "omdb_details",
            )
            .await?,
        };

        txn.commit().await.context("Failed to commit load")?;
        info!(%counts, "Store refreshed");

        Ok(counts)
    }
}
