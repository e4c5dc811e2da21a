//! Fixed, re-runnable DDL. Every statement is conditioned on the object not
//! existing yet, so applying it to a populated store is a no-op.

use crate::entities::{movie_genres, movies, prelude::*, ratings};
use crate::parser::rating::{MAX_RATING, MIN_RATING};
use crate::parser::title::{MAX_YEAR, MIN_YEAR};
use sea_orm::{ConnectionTrait, DbErr, Schema, Statement};
use sea_orm_migration::SchemaManager;
use sea_orm_migration::prelude::*;
use tracing::debug;

/// Names of the secondary indexes.
pub const INDEXES: [&str; 3] = [
    "idx_ratings_movie_id",
    "idx_ratings_user_id",
    "idx_movie_genres_genre",
];

pub async fn enable_foreign_keys<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        conn.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;
    Ok(())
}

pub async fn apply(conn: &sea_orm::DatabaseConnection) -> Result<(), DbErr> {
    enable_foreign_keys(conn).await?;

    let manager = SchemaManager::new(conn);
    let schema = Schema::new(manager.get_database_backend());

    // Parents before children so foreign keys resolve.
    manager
        .create_table(
            schema
                .create_table_from_entity(Movies)
                .if_not_exists()
                .check(
                    Expr::col(movies::Column::Year)
                        .is_null()
                        .or(Expr::col(movies::Column::Year).between(MIN_YEAR, MAX_YEAR)),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            schema
                .create_table_from_entity(Genres)
                .if_not_exists()
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            schema
                .create_table_from_entity(MovieGenres)
                .if_not_exists()
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            schema
                .create_table_from_entity(Users)
                .if_not_exists()
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            schema
                .create_table_from_entity(Ratings)
                .if_not_exists()
                .check(Expr::col(ratings::Column::Rating).between(MIN_RATING, MAX_RATING))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            schema
                .create_table_from_entity(OmdbDetails)
                .if_not_exists()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(INDEXES[0])
                .table(Ratings)
                .col(ratings::Column::MovieId)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(INDEXES[1])
                .table(Ratings)
                .col(ratings::Column::UserId)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(INDEXES[2])
                .table(MovieGenres)
                .col(movie_genres::Column::Genre)
                .to_owned(),
        )
        .await?;

    debug!("Schema applied");
    Ok(())
}
