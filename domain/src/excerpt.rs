//! Excerpt extraction from article bodies.
//!
//! The leading sentences of an article carry its definition and main facts,
//! so the excerpt is a bounded prefix of sentence units rather than a random
//! slice.

/// Delimiter splitting an article body into sentence units.
pub const SENTENCE_DELIMITER: &str = ". ";

/// Extract the first `take_sentences` sentence units of `text`, rejoined
/// with the delimiter and a trailing terminator.
///
/// Returns `None` when the body splits into fewer than `min_sentences`
/// units; the caller discards the article and resamples.
pub fn excerpt(text: &str, min_sentences: usize, take_sentences: usize) -> Option<String> {
    let sentences: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    if sentences.len() < min_sentences {
        return None;
    }
    let take = take_sentences.min(sentences.len());
    Some(format!("{}.", sentences[..take].join(SENTENCE_DELIMITER)))
}
