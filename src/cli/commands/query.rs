//! Analytical query command handlers

use crate::cli::QueryCommands;
use crate::config::Config;
use crate::db::Store;
use serde::Serialize;

fn print_json<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

pub async fn cmd_query(config: &Config, query: &QueryCommands, json: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    match query {
        QueryCommands::TopMovies { min_ratings } => {
            let rows = store.top_rated_movies(*min_ratings).await?;
            if json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No movies with at least {} ratings.", min_ratings);
                return Ok(());
            }
            println!("Top rated (min {} ratings)", min_ratings);
            println!("{:-<70}", "");
            for row in rows {
                println!(
                    "{:>6}  {:<45} {:.3} ({} ratings)",
                    row.movie_id, row.title, row.average_rating, row.rating_count
                );
            }
        }

        QueryCommands::TopDirector => {
            let rows = store.most_prolific_directors().await?;
            if json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No director metadata loaded.");
                return Ok(());
            }
            for row in rows {
                println!("{} ({} movies)", row.director, row.movie_count);
            }
        }

        QueryCommands::TopGenres { limit } => {
            let rows = store.top_genres_by_average(*limit).await?;
            if json {
                return print_json(&rows);
            }
            println!("{:<20} {:>8} {:>10}", "Genre", "Average", "Ratings");
            println!("{:-<40}", "");
            for row in rows {
                println!(
                    "{:<20} {:>8.3} {:>10}",
                    row.genre, row.average_rating, row.rating_count
                );
            }
        }

        QueryCommands::Yearly => {
            let rows = store.average_rating_by_year().await?;
            if json {
                return print_json(&rows);
            }
            println!("{:<6} {:>8} {:>10}", "Year", "Average", "Ratings");
            println!("{:-<26}", "");
            for row in rows {
                println!(
                    "{:<6} {:>8.3} {:>10}",
                    row.year, row.average_rating, row.rating_count
                );
            }
        }
    }

    Ok(())
}
