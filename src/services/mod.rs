pub mod builder;
pub use builder::{BuildReport, EntityBuilder};

pub mod metadata;
pub use metadata::{LookupError, MetadataLookup};

pub mod extract;
pub use extract::{ExtractReport, fetch_metadata};

pub mod transform;
pub mod load;
