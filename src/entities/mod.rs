pub mod prelude;

pub mod genres;
pub mod movie_genres;
pub mod movies;
pub mod omdb_details;
pub mod ratings;
pub mod users;
