//! Multiple-choice question records and completion-response validation.
//!
//! The completion service returns free-form text that is supposed to be a
//! JSON array of question records. [`parse_completion`] is the strict,
//! fail-closed parser for that text: any schema mismatch is an error routed
//! back to the caller's retry budget, never partially accepted.

use crate::taxonomy::TopicLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Stable identifier of one of the five answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    #[serde(rename = "option_1")]
    Option1,
    #[serde(rename = "option_2")]
    Option2,
    #[serde(rename = "option_3")]
    Option3,
    #[serde(rename = "option_4")]
    Option4,
    #[serde(rename = "option_5")]
    Option5,
}

impl AnswerKey {
    /// All option identifiers, in option order.
    pub const ALL: [AnswerKey; 5] = [
        AnswerKey::Option1,
        AnswerKey::Option2,
        AnswerKey::Option3,
        AnswerKey::Option4,
        AnswerKey::Option5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKey::Option1 => "option_1",
            AnswerKey::Option2 => "option_2",
            AnswerKey::Option3 => "option_3",
            AnswerKey::Option4 => "option_4",
            AnswerKey::Option5 => "option_5",
        }
    }

    /// Public dataset column letter for this option.
    pub fn letter(&self) -> char {
        match self {
            AnswerKey::Option1 => 'A',
            AnswerKey::Option2 => 'B',
            AnswerKey::Option3 => 'C',
            AnswerKey::Option4 => 'D',
            AnswerKey::Option5 => 'E',
        }
    }

    /// Parse an option identifier, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The exact key set a well-formed question record must carry.
const RESPONSE_KEYS: [&str; 7] = [
    "question", "option_1", "option_2", "option_3", "option_4", "option_5", "answer",
];

/// Errors raised while validating completion output.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Response is not a JSON array of records: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response contains no question records")]
    Empty,

    #[error("Record {index} has wrong key set: [{keys}]")]
    WrongKeys { index: usize, keys: String },

    #[error("Record {index} answer '{answer}' matches no option")]
    UnresolvableAnswer { index: usize, answer: String },

    #[error("Record {index} answer option {key} has empty text")]
    EmptyAnswerText { index: usize, key: AnswerKey },
}

/// A validated question record, not yet tied to a source article.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestion {
    pub question: String,
    /// Option texts, in [`AnswerKey::ALL`] order.
    pub options: [String; 5],
    pub answer: AnswerKey,
}

impl ParsedQuestion {
    pub fn option(&self, key: AnswerKey) -> &str {
        &self.options[key as usize]
    }

    /// Attach provenance, producing the full record kept in checkpoints.
    pub fn into_question(self, provenance: Provenance) -> MultipleChoiceQuestion {
        let [option_1, option_2, option_3, option_4, option_5] = self.options;
        MultipleChoiceQuestion {
            question: self.question,
            option_1,
            option_2,
            option_3,
            option_4,
            option_5,
            answer: self.answer,
            excerpt: provenance.excerpt,
            page_id: provenance.page_id,
            page_title: provenance.page_title,
            topic: provenance.topic,
        }
    }
}

/// Where a question came from: the excerpt it was generated from and the
/// source article's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub excerpt: String,
    pub page_id: u64,
    pub page_title: String,
    pub topic: TopicLabel,
}

/// One accepted multiple-choice question with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub option_1: String,
    pub option_2: String,
    pub option_3: String,
    pub option_4: String,
    pub option_5: String,
    pub answer: AnswerKey,
    pub excerpt: String,
    pub page_id: u64,
    pub page_title: String,
    pub topic: TopicLabel,
}

impl MultipleChoiceQuestion {
    pub fn option(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::Option1 => &self.option_1,
            AnswerKey::Option2 => &self.option_2,
            AnswerKey::Option3 => &self.option_3,
            AnswerKey::Option4 => &self.option_4,
            AnswerKey::Option5 => &self.option_5,
        }
    }

    /// Text of the correct option.
    pub fn answer_text(&self) -> &str {
        self.option(self.answer)
    }
}

/// Parse and validate raw completion text as a sequence of question records.
///
/// Validation requires a non-empty JSON array in which every record's key
/// set exactly equals {question, option_1..option_5, answer}. An `answer`
/// value that is not itself an option identifier is resolved by
/// case-insensitive matching against the option texts and rewritten to the
/// matching identifier; no match fails the whole response.
pub fn parse_completion(raw: &str) -> Result<Vec<ParsedQuestion>, ValidationError> {
    let records: Vec<HashMap<String, String>> = serde_json::from_str(extract_json_array(raw))?;

    if records.is_empty() {
        return Err(ValidationError::Empty);
    }

    records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_record(index, record))
        .collect()
}

/// Narrow raw completion text to the outermost JSON array, tolerating
/// markdown fences or prose around it. Returns the input unchanged when no
/// bracket pair is found so serde reports the real error.
fn extract_json_array(raw: &str) -> &str {
    match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

fn validate_record(
    index: usize,
    record: &HashMap<String, String>,
) -> Result<ParsedQuestion, ValidationError> {
    let keys_match = record.len() == RESPONSE_KEYS.len()
        && RESPONSE_KEYS.iter().all(|key| record.contains_key(*key));
    if !keys_match {
        let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        return Err(ValidationError::WrongKeys {
            index,
            keys: keys.join(", "),
        });
    }

    let field = |key: &str| record[key].clone();
    let options = [
        field("option_1"),
        field("option_2"),
        field("option_3"),
        field("option_4"),
        field("option_5"),
    ];

    let raw_answer = &record["answer"];
    let answer = resolve_answer(raw_answer, &options).ok_or_else(|| {
        ValidationError::UnresolvableAnswer {
            index,
            answer: raw_answer.clone(),
        }
    })?;

    if options[answer as usize].trim().is_empty() {
        return Err(ValidationError::EmptyAnswerText { index, key: answer });
    }

    Ok(ParsedQuestion {
        question: field("question"),
        options,
        answer,
    })
}

/// Resolve an answer value to an option identifier: first as an identifier
/// itself, then by case-insensitive match against the option texts.
fn resolve_answer(answer: &str, options: &[String; 5]) -> Option<AnswerKey> {
    if let Some(key) = AnswerKey::parse(answer) {
        return Some(key);
    }
    AnswerKey::ALL
        .into_iter()
        .find(|key| options[*key as usize].eq_ignore_ascii_case(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(answer: &str) -> String {
        format!(
            r#"[{{
                "question": "What is 2+2?",
                "option_1": "3",
                "option_2": "4",
                "option_3": "5",
                "option_4": "6",
                "option_5": "7",
                "answer": "{answer}"
            }}]"#
        )
    }

    #[test]
    fn test_parse_well_formed_response() {
        let parsed = parse_completion(&record_json("option_2")).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "What is 2+2?");
        assert_eq!(parsed[0].answer, AnswerKey::Option2);
        assert_eq!(parsed[0].option(AnswerKey::Option2), "4");
    }

    #[test]
    fn test_answer_resolved_from_option_text() {
        // The model answered with the option's text, not its identifier
        let parsed = parse_completion(&record_json("4")).unwrap();
        assert_eq!(parsed[0].answer, AnswerKey::Option2);
    }

    #[test]
    fn test_answer_resolution_is_case_insensitive() {
        let raw = r#"[{
            "question": "Largest planet?",
            "option_1": "Jupiter",
            "option_2": "Mars",
            "option_3": "Venus",
            "option_4": "Saturn",
            "option_5": "Neptune",
            "answer": "JUPITER"
        }]"#;
        let parsed = parse_completion(raw).unwrap();
        assert_eq!(parsed[0].answer, AnswerKey::Option1);

        // Identifier casing is also tolerated
        let parsed = parse_completion(&record_json("Option_3")).unwrap();
        assert_eq!(parsed[0].answer, AnswerKey::Option3);
    }

    #[test]
    fn test_unresolvable_answer_rejected() {
        let result = parse_completion(&record_json("42"));
        assert!(matches!(
            result,
            Err(ValidationError::UnresolvableAnswer { index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_key_rejected() {
        let raw = r#"[{
            "question": "Q",
            "option_1": "a",
            "option_2": "b",
            "option_3": "c",
            "option_4": "d",
            "option_5": "e"
        }]"#;
        assert!(matches!(
            parse_completion(raw),
            Err(ValidationError::WrongKeys { index: 0, .. })
        ));
    }

    #[test]
    fn test_extra_key_rejected() {
        let raw = r#"[{
            "question": "Q",
            "option_1": "a",
            "option_2": "b",
            "option_3": "c",
            "option_4": "d",
            "option_5": "e",
            "answer": "option_1",
            "explanation": "because"
        }]"#;
        assert!(matches!(
            parse_completion(raw),
            Err(ValidationError::WrongKeys { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(matches!(parse_completion("[]"), Err(ValidationError::Empty)));
    }

    #[test]
    fn test_non_json_rejected() {
        assert!(matches!(
            parse_completion("I'm sorry, I can't do that."),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_fenced_json_accepted() {
        let raw = format!("```json\n{}\n```", record_json("option_1"));
        let parsed = parse_completion(&raw).unwrap();
        assert_eq!(parsed[0].answer, AnswerKey::Option1);
    }

    #[test]
    fn test_second_record_failure_rejects_whole_response() {
        let raw = r#"[
            {"question": "Q1", "option_1": "a", "option_2": "b", "option_3": "c",
             "option_4": "d", "option_5": "e", "answer": "option_1"},
            {"question": "Q2", "option_1": "a", "option_2": "b", "option_3": "c",
             "option_4": "d", "option_5": "e", "answer": "nope"}
        ]"#;
        assert!(matches!(
            parse_completion(raw),
            Err(ValidationError::UnresolvableAnswer { index: 1, .. })
        ));
    }

    #[test]
    fn test_into_question_carries_provenance() {
        let parsed = parse_completion(&record_json("option_2")).unwrap();
        let question = parsed[0].clone().into_question(Provenance {
            excerpt: "Some excerpt.".to_string(),
            page_id: 42,
            page_title: "Arithmetic".to_string(),
            topic: "M".into(),
        });
        assert_eq!(question.page_id, 42);
        assert_eq!(question.topic.as_str(), "M");
        assert_eq!(question.answer_text(), "4");
    }

    #[test]
    fn test_answer_key_letters() {
        let letters: Vec<char> = AnswerKey::ALL.iter().map(AnswerKey::letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[test]
    fn test_answer_key_serde_uses_identifier() {
        let json = serde_json::to_string(&AnswerKey::Option4).unwrap();
        assert_eq!(json, r#""option_4""#);
        let key: AnswerKey = serde_json::from_str(r#""option_4""#).unwrap();
        assert_eq!(key, AnswerKey::Option4);
    }
}
