//! JSON file checkpoint store.
//!
//! Two run-date-stamped slots under one directory:
//! `questions_{date}.json` and `seen_pages_{date}.json`. Each save writes
//! the whole value to a temp file and renames it over the slot, so a reader
//! resuming a crashed run always sees a consistent snapshot as of the last
//! fully completed article.

use quizsmith_application::{CheckpointError, CheckpointStore};
use quizsmith_domain::{MultipleChoiceQuestion, SeenPages};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Today's date in the slot-name format.
pub fn run_date_today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// File-backed [`CheckpointStore`].
pub struct FileCheckpointStore {
    questions_path: PathBuf,
    seen_pages_path: PathBuf,
}

impl FileCheckpointStore {
    /// Slot files for `run_date` under `dir`. Nothing is created until the
    /// first save.
    pub fn new(dir: impl AsRef<Path>, run_date: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            questions_path: dir.join(format!("questions_{run_date}.json")),
            seen_pages_path: dir.join(format!("seen_pages_{run_date}.json")),
        }
    }

    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    pub fn seen_pages_path(&self) -> &Path {
        &self.seen_pages_path
    }

    fn save_slot<T: Serialize>(path: &Path, value: &T) -> Result<(), CheckpointError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "Checkpoint slot written");
        Ok(())
    }

    fn load_slot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CheckpointError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save_questions(&self, questions: &[MultipleChoiceQuestion]) -> Result<(), CheckpointError> {
        Self::save_slot(&self.questions_path, &questions)
    }

    fn load_questions(&self) -> Result<Option<Vec<MultipleChoiceQuestion>>, CheckpointError> {
        Self::load_slot(&self.questions_path)
    }

    fn save_seen_pages(&self, seen: &SeenPages) -> Result<(), CheckpointError> {
        Self::save_slot(&self.seen_pages_path, seen)
    }

    fn load_seen_pages(&self) -> Result<Option<SeenPages>, CheckpointError> {
        Self::load_slot(&self.seen_pages_path)
    }
}
