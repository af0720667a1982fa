//! Public dataset formatting.
//!
//! Reshapes accepted question records into the tabular schema downstream
//! consumers expect: sequential ids, single-letter option columns, the
//! answer remapped to its letter, provenance dropped. Pure: formatting the
//! same list twice yields identical rows.

#[cfg(test)]
use crate::question::AnswerKey;
use crate::question::MultipleChoiceQuestion;

/// Column names of the dataset artifact, in order.
pub const DATASET_COLUMNS: [&str; 8] = ["id", "prompt", "A", "B", "C", "D", "E", "answer"];

/// One row of the public dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub id: usize,
    pub prompt: String,
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub e: String,
    /// One of the letters A-E.
    pub answer: char,
}

/// Format accepted questions as dataset rows with zero-based sequential ids.
pub fn to_dataset(questions: &[MultipleChoiceQuestion]) -> Vec<DatasetRow> {
    questions
        .iter()
        .enumerate()
        .map(|(id, q)| DatasetRow {
            id,
            prompt: q.question.clone(),
            a: q.option_1.clone(),
            b: q.option_2.clone(),
            c: q.option_3.clone(),
            d: q.option_4.clone(),
            e: q.option_5.clone(),
            answer: q.answer.letter(),
        })
        .collect()
}
