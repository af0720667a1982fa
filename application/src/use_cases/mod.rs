//! Use cases for dataset generation.

pub mod gather_dataset;
pub mod sample_article;
