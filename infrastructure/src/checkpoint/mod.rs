//! Checkpoint adapter: JSON files with whole-file overwrite semantics.

mod file_store;

pub use file_store::{FileCheckpointStore, run_date_today};
