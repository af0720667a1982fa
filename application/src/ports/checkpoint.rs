//! Checkpoint storage port
//!
//! Two named slots per run (the accumulated question list and the
//! seen-pages set), each with whole-value overwrite and whole-value load
//! semantics, so a resuming reader always sees a consistent snapshot as of
//! the last fully completed article.
//!
//! Write failures are fatal to the run: the generation loop propagates them
//! immediately rather than risk silent data loss.

use quizsmith_domain::{MultipleChoiceQuestion, SeenPages};
use thiserror::Error;

/// Errors that can occur reading or writing checkpoint slots.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Durable storage for resumable run state.
///
/// There is exactly one writer (the generation loop) and no concurrent
/// readers during a run, so implementations need no locking, only the
/// whole-value overwrite guarantee.
pub trait CheckpointStore: Send + Sync {
    /// Overwrite the accumulated-questions slot.
    fn save_questions(&self, questions: &[MultipleChoiceQuestion]) -> Result<(), CheckpointError>;

    /// Load the accumulated-questions slot. `None` means no checkpoint
    /// exists (fresh run).
    fn load_questions(&self) -> Result<Option<Vec<MultipleChoiceQuestion>>, CheckpointError>;

    /// Overwrite the seen-pages slot.
    fn save_seen_pages(&self, seen: &SeenPages) -> Result<(), CheckpointError>;

    /// Load the seen-pages slot. `None` means no checkpoint exists.
    fn load_seen_pages(&self) -> Result<Option<SeenPages>, CheckpointError>;
}
