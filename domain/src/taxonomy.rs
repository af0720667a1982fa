//! Topic taxonomy for the category walk.
//!
//! A [`Taxonomy`] maps a small set of topic labels to seed category titles,
//! carries a relative sampling weight per label, and holds the set of
//! subcategory titles the walk must never descend into. It is an immutable
//! value constructed once at process start and passed explicitly into the
//! sampler.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Title prefix that distinguishes category nodes from leaf articles.
pub const CATEGORY_PREFIX: &str = "Category:";

/// Whether a page title names a category rather than a leaf article.
pub fn is_category_title(title: &str) -> bool {
    title.starts_with(CATEGORY_PREFIX)
}

/// Short subject code grouping multiple seed categories (e.g. `S`, `M`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicLabel(String);

impl TopicLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TopicLabel {
    fn from(s: &str) -> Self {
        TopicLabel::new(s)
    }
}

/// One topic entry: label, relative weight, and its seed categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub label: TopicLabel,
    /// Relative weight used in weighted label selection. Not normalized.
    pub weight: f64,
    /// Category titles the walk may start from for this topic.
    pub seed_categories: Vec<String>,
}

impl Topic {
    pub fn new(
        label: impl Into<TopicLabel>,
        weight: f64,
        seed_categories: Vec<String>,
    ) -> Self {
        Self {
            label: label.into(),
            weight,
            seed_categories,
        }
    }
}

/// Errors raised when constructing an invalid taxonomy.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Taxonomy has no topics")]
    Empty,

    #[error("Topic '{0}' has no seed categories")]
    NoSeedCategories(String),

    #[error("Topic '{0}' has invalid weight {1} (must be positive and finite)")]
    InvalidWeight(String, f64),
}

/// Immutable category taxonomy: topics with weights plus an exclusion set.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    topics: Vec<Topic>,
    excluded: HashSet<String>,
}

impl Taxonomy {
    /// Build a taxonomy, validating that every topic has at least one seed
    /// category and a positive finite weight.
    pub fn new(topics: Vec<Topic>, excluded: HashSet<String>) -> Result<Self, TaxonomyError> {
        if topics.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        for topic in &topics {
            if topic.seed_categories.is_empty() {
                return Err(TaxonomyError::NoSeedCategories(topic.label.to_string()));
            }
            if !(topic.weight.is_finite() && topic.weight > 0.0) {
                return Err(TaxonomyError::InvalidWeight(
                    topic.label.to_string(),
                    topic.weight,
                ));
            }
        }
        Ok(Self { topics, excluded })
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Relative weights, in topic order.
    pub fn weights(&self) -> Vec<f64> {
        self.topics.iter().map(|t| t.weight).collect()
    }

    /// Whether a category title is in the exclusion set.
    pub fn is_excluded(&self, title: &str) -> bool {
        self.excluded.contains(title)
    }

    /// The exclusion set, sorted for stable presentation.
    pub fn excluded_categories(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.excluded.iter().cloned().collect();
        titles.sort_unstable();
        titles
    }
}

impl Default for Taxonomy {
    /// The STEM taxonomy the generator ships with: four labels with a slight
    /// weight bias toward applied sciences.
    fn default() -> Self {
        let topics = vec![
            Topic::new(
                "S",
                1.25,
                vec![
                    "Category:Applied_sciences".to_string(),
                    "Category:Biotechnology".to_string(),
                    "Category:Biology".to_string(),
                    "Category:Natural_history".to_string(),
                ],
            ),
            Topic::new(
                "T",
                1.0,
                vec![
                    "Category:Technology_strategy".to_string(),
                    "Category:Technical_specifications".to_string(),
                    "Category:Technology_assessment".to_string(),
                    "Category:Technology_hazards".to_string(),
                    "Category:Technology_systems".to_string(),
                    "Category:Hypothetical_technology".to_string(),
                    "Category:Technical_communication".to_string(),
                    "Category:Technological_comparisons".to_string(),
                ],
            ),
            Topic::new(
                "E",
                1.0,
                vec![
                    "Category:Engineering_disciplines".to_string(),
                    "Category:Engineering_concepts".to_string(),
                    "Category:Industrial_equipment".to_string(),
                    "Category:Manufacturing".to_string(),
                ],
            ),
            Topic::new(
                "M",
                1.0,
                vec![
                    "Category:Fields_of_mathematics".to_string(),
                    "Category:Physical_sciences".to_string(),
                ],
            ),
        ];
        let excluded = [
            "Category:Technology",
            "Category:Mathematics",
            "Category:Works about technology",
            "Category:Technology evangelism",
            "Category:Artificial objects",
            "Category:Fictional physical scientists",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self::new(topics, excluded).expect("default taxonomy is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_topic(weight: f64, seeds: Vec<String>) -> Vec<Topic> {
        vec![Topic::new("M", weight, seeds)]
    }

    #[test]
    fn test_default_taxonomy_is_valid() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.topics().len(), 4);
        assert_eq!(taxonomy.weights()[0], 1.25);
        assert!(taxonomy.is_excluded("Category:Mathematics"));
        assert!(!taxonomy.is_excluded("Category:Fields_of_mathematics"));
    }

    #[test]
    fn test_empty_taxonomy_rejected() {
        let result = Taxonomy::new(vec![], HashSet::new());
        assert!(matches!(result, Err(TaxonomyError::Empty)));
    }

    #[test]
    fn test_topic_without_seeds_rejected() {
        let result = Taxonomy::new(one_topic(1.0, vec![]), HashSet::new());
        assert!(matches!(result, Err(TaxonomyError::NoSeedCategories(_))));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Taxonomy::new(
                one_topic(weight, vec!["Category:Algebra".to_string()]),
                HashSet::new(),
            );
            assert!(matches!(result, Err(TaxonomyError::InvalidWeight(_, _))));
        }
    }

    #[test]
    fn test_category_title_prefix() {
        assert!(is_category_title("Category:Physical_sciences"));
        assert!(!is_category_title("Pythagorean theorem"));
    }
}
