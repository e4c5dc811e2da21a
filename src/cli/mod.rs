//! CLI module - Command-line interface for movie-etl
//!
//! Parsed with clap; each command lives in its own file under `commands/`.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// movie-etl - MovieLens + OMDb ETL into SQLite
#[derive(Parser)]
#[command(name = "movie-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the search paths
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Extract,
    Transform,
    Load,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pipeline steps in the given order
    Run {
        /// Steps to run
        #[arg(long, num_args = 1.., value_enum, default_values_t = [Step::Extract, Step::Transform, Step::Load])]
        steps: Vec<Step>,
    },

    /// Download MovieLens and fetch OMDb metadata
    Extract,

    /// Normalize raw files into processed tables
    Transform,

    /// Load processed tables into the database (full refresh)
    Load,

    /// Apply the database schema only
    InitDb,

    /// Run an analytical query against the loaded data
    #[command(alias = "q")]
    Query {
        /// Print rows as JSON
        #[arg(long, global = true)]
        json: bool,

        #[command(subcommand)]
        query: QueryCommands,
    },

    /// Show row counts per table
    Stats,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Highest average rated movie(s), ties included
    TopMovies {
        /// Ignore movies with fewer ratings than this
        #[arg(long, default_value = "1")]
        min_ratings: u32,
    },

    /// Director(s) with the most movies
    TopDirector,

    /// Genres by average rating
    TopGenres {
        /// Number of genres to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Average rating per release year
    Yearly,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults_to_all_steps() {
        let cli = Cli::try_parse_from(["movie-etl", "run"]).unwrap();
        match cli.command {
            Some(Commands::Run { steps }) => {
                assert_eq!(steps, vec![Step::Extract, Step::Transform, Step::Load]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_keeps_given_order() {
        let cli =
            Cli::try_parse_from(["movie-etl", "run", "--steps", "load", "transform"]).unwrap();
        match cli.command {
            Some(Commands::Run { steps }) => assert_eq!(steps, vec![Step::Load, Step::Transform]),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Cli::try_parse_from(["movie-etl", "run", "--steps", "publish"]).is_err());
    }

    #[test]
    fn test_query_flags() {
        let cli = Cli::try_parse_from([
            "movie-etl",
            "--config",
            "etl.toml",
            "query",
            "top-movies",
            "--min-ratings",
            "50",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("etl.toml")));
        match cli.command {
            Some(Commands::Query {
                json,
                query: QueryCommands::TopMovies { min_ratings },
            }) => {
                assert!(json);
                assert_eq!(min_ratings, 50);
            }
            _ => panic!("expected query top-movies"),
        }
    }
}
