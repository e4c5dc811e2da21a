pub mod entity_set;
pub mod raw;

pub use entity_set::{EntitySet, IntegrityError, TableCounts};
pub use raw::{RawLink, RawMetadata, RawMovie, RawRating};
