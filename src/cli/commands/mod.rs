mod init;
mod pipeline;
mod query;
mod stats;

pub use init::cmd_init;
pub use pipeline::{cmd_extract, cmd_init_db, cmd_load, cmd_run, cmd_transform};
pub use query::cmd_query;
pub use stats::cmd_stats;
