//! Domain layer for quizsmith
//!
//! This crate contains the core types and pure logic: the topic taxonomy
//! driving the category walk, multiple-choice question records with
//! completion-response validation, excerpt extraction, the seen-pages set,
//! and the public dataset formatter. It has no dependencies on
//! infrastructure or presentation concerns. No I/O, no async.

pub mod dataset;
pub mod excerpt;
pub mod question;
pub mod seen_pages;
pub mod taxonomy;

// Re-export commonly used types
pub use dataset::{DATASET_COLUMNS, DatasetRow, to_dataset};
pub use excerpt::{SENTENCE_DELIMITER, excerpt};
pub use question::{
    AnswerKey, MultipleChoiceQuestion, ParsedQuestion, Provenance, ValidationError,
    parse_completion,
};
pub use seen_pages::SeenPages;
pub use taxonomy::{CATEGORY_PREFIX, Taxonomy, TaxonomyError, Topic, TopicLabel, is_category_title};
