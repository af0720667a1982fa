//! Infrastructure layer for quizsmith
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod checkpoint;
pub mod completion;
pub mod config;
pub mod dataset;
pub mod encyclopedia;
pub mod observer;

// Re-export commonly used types
pub use checkpoint::{FileCheckpointStore, run_date_today};
pub use completion::OpenAiCompletionClient;
pub use config::{
    ConfigLoader, FileCompletionConfig, FileConfig, FileEncyclopediaConfig, FileGenerationConfig,
    FileOutputConfig, FileTaxonomyConfig,
};
pub use dataset::write_dataset_csv;
pub use encyclopedia::MediaWikiClient;
pub use observer::JsonlRunObserver;
