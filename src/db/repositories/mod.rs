pub mod analytics;
pub mod refresh;

pub use analytics::{AnalyticsRepository, DirectorCount, GenreAverage, MovieAverage, YearAverage};
pub use refresh::RefreshRepository;
