//! Application layer for quizsmith
//!
//! This crate contains the use cases driving dataset generation (the
//! random category walk and the checkpointed generation loop) plus the
//! port definitions for the external collaborators they depend on. It
//! depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::GenerationParams;
pub use ports::{
    checkpoint::{CheckpointError, CheckpointStore},
    completion::{CompletionError, CompletionPort, CompletionRequest},
    encyclopedia::{ArticlePage, CategoryPage, EncyclopediaError, EncyclopediaPort, PageNode},
    observer::{NoRunObserver, RunEvent, RunObserver},
};
pub use use_cases::gather_dataset::{
    GatherDatasetUseCase, GatherError, GatherInput, GatherOutcome, GatherReport,
};
pub use use_cases::sample_article::{SampleArticleUseCase, SampleError, SampledArticle};
