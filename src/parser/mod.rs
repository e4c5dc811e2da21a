//! Field-level normalizers.
//!
//! Every function here takes a single raw field and returns either a clean
//! value or an explicit absence. None of them panic on malformed input.

pub mod ids;
pub mod metadata;
pub mod rating;
pub mod title;

pub use ids::{parse_id, parse_numeric_external_id, to_canonical_external_id};
pub use metadata::{clean_text, parse_box_office, parse_released_date, parse_runtime};
pub use rating::{RowError, normalize_timestamp, parse_rating};
pub use title::{NO_GENRES_SENTINEL, extract_year, split_genres};
