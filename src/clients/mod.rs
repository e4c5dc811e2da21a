pub mod movielens;
pub mod omdb;

pub use movielens::DatasetClient;
pub use omdb::{OmdbClient, OmdbMovie};
