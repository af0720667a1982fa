//! Configuration loading: raw TOML structure and multi-source merging.

mod file_config;
mod loader;

pub use file_config::{
    FileCompletionConfig, FileConfig, FileEncyclopediaConfig, FileGenerationConfig,
    FileOutputConfig, FileTaxonomyConfig, FileTopicConfig,
};
pub use loader::ConfigLoader;
