pub use super::genres::Entity as Genres;
pub use super::movie_genres::Entity as MovieGenres;
pub use super::movies::Entity as Movies;
pub use super::omdb_details::Entity as OmdbDetails;
pub use super::ratings::Entity as Ratings;
pub use super::users::Entity as Users;
