//! Sample Article use case.
//!
//! Performs the random category walk: pick a topic by weight, pick one of
//! its seed categories, then descend the category tree until an unseen,
//! long-enough leaf article is found, at each node choosing 50/50 between
//! the subcategory partition and the article partition.
//!
//! The 50/50 partition choice is deliberately *not* proportional to
//! partition size: it biases the walk toward going deeper instead of
//! grabbing whichever list happens to be larger.
//!
//! Every failure below this layer is transient by policy: a fetch error, a
//! descent dead-end, an already-seen or too-short article all restart the
//! whole attempt with an incremented seed. The seed is incremented *before*
//! any operation that can fail, so replaying a starting seed reproduces the
//! same attempt sequence against identical service data.

use crate::config::GenerationParams;
use crate::ports::encyclopedia::{ArticlePage, EncyclopediaError, EncyclopediaPort, PageNode};
use quizsmith_domain::{SeenPages, Taxonomy, TopicLabel, excerpt, is_category_title};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand::distributions::{Distribution, WeightedIndex};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during article sampling.
#[derive(Error, Debug)]
pub enum SampleError {
    /// Every attempt within the budget failed: dead taxonomy, exhausted
    /// category, or an unreachable service.
    #[error("Sampling gave up after {0} attempts")]
    Exhausted(usize),
}

/// A sampled article ready for question generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledArticle {
    /// Leading-sentence excerpt used as grounding text.
    pub excerpt: String,
    pub page_id: u64,
    pub title: String,
    pub topic: TopicLabel,
}

/// Why a single attempt was restarted. All variants are retryable.
#[derive(Debug)]
enum AttemptError {
    Fetch(EncyclopediaError),
    /// The descent spent its step budget inside one category.
    DescentExhausted,
}

impl From<EncyclopediaError> for AttemptError {
    fn from(err: EncyclopediaError) -> Self {
        AttemptError::Fetch(err)
    }
}

/// Use case for sampling one unseen article via the category walk.
pub struct SampleArticleUseCase {
    encyclopedia: Arc<dyn EncyclopediaPort>,
}

impl SampleArticleUseCase {
    pub fn new(encyclopedia: Arc<dyn EncyclopediaPort>) -> Self {
        Self { encyclopedia }
    }

    /// Sample one article not in `seen`, restarting with an incremented
    /// seed until one is found or the attempt budget runs out.
    pub async fn execute(
        &self,
        taxonomy: &Taxonomy,
        params: &GenerationParams,
        seen: &SeenPages,
        seed: u64,
    ) -> Result<SampledArticle, SampleError> {
        let mut seed = seed;
        for _ in 0..params.max_sample_attempts {
            // Incremented before anything that can fail
            seed = seed.wrapping_add(1);
            match self.attempt(taxonomy, params, seen, seed).await {
                Ok(Some(article)) => return Ok(article),
                Ok(None) => {
                    debug!(seed, "Article already seen or too short, resampling");
                    seed = seed.wrapping_add(1);
                }
                Err(AttemptError::Fetch(err)) => {
                    warn!(seed, error = %err, "Encyclopedia fetch failed, resampling");
                    seed = seed.wrapping_add(1);
                }
                Err(AttemptError::DescentExhausted) => {
                    warn!(seed, "Category descent hit its step budget, resampling");
                    seed = seed.wrapping_add(1);
                }
            }
        }
        Err(SampleError::Exhausted(params.max_sample_attempts))
    }

    /// One full attempt: topic, seed category, descent, seen/length checks.
    ///
    /// `Ok(None)` means the walk landed on a usable node that the run must
    /// skip (already seen, or too short for an excerpt).
    async fn attempt(
        &self,
        taxonomy: &Taxonomy,
        params: &GenerationParams,
        seen: &SeenPages,
        seed: u64,
    ) -> Result<Option<SampledArticle>, AttemptError> {
        let mut rng = StdRng::seed_from_u64(seed);

        let weights = taxonomy.weights();
        let label_dist =
            WeightedIndex::new(&weights).expect("taxonomy weights validated at construction");
        let topic = &taxonomy.topics()[label_dist.sample(&mut rng)];

        let seed_category = topic
            .seed_categories
            .choose(&mut rng)
            .expect("taxonomy seed categories validated non-empty");
        debug!(topic = %topic.label, category = %seed_category, "Starting descent");

        let article = self.descend(taxonomy, params, &mut rng, seed_category).await?;

        if seen.contains(article.page_id) {
            return Ok(None);
        }

        let Some(text) = excerpt(&article.text, params.min_sentences, params.take_sentences)
        else {
            debug!(page_id = article.page_id, "Article too short for an excerpt");
            return Ok(None);
        };

        Ok(Some(SampledArticle {
            excerpt: text,
            page_id: article.page_id,
            title: article.title,
            topic: topic.label.clone(),
        }))
    }

    /// Walk down from `start` until a leaf article is fetched.
    ///
    /// Members in the exclusion set are invisible to the walk. A node whose
    /// partitions are both empty is refetched, which counts against the
    /// step budget so a barren category cannot trap the walk.
    async fn descend(
        &self,
        taxonomy: &Taxonomy,
        params: &GenerationParams,
        rng: &mut StdRng,
        start: &str,
    ) -> Result<ArticlePage, AttemptError> {
        let mut current = start.to_string();

        for _ in 0..params.max_descent_steps {
            let members = match self.encyclopedia.fetch_node(&current).await? {
                PageNode::Article(article) => return Ok(article),
                PageNode::Category(page) => page.members,
            };

            let mut subcategories = Vec::new();
            let mut articles = Vec::new();
            for member in members {
                if is_category_title(&member) {
                    if !taxonomy.is_excluded(&member) {
                        subcategories.push(member);
                    }
                } else {
                    articles.push(member);
                }
            }

            let chosen_list = if subcategories.is_empty() && articles.is_empty() {
                continue;
            } else if subcategories.is_empty() {
                &articles
            } else if articles.is_empty() {
                &subcategories
            } else if rng.gen_bool(0.5) {
                &subcategories
            } else {
                &articles
            };

            let member = chosen_list
                .choose(rng)
                .expect("chosen partition is non-empty")
                .clone();

            if is_category_title(&member) {
                current = member;
                continue;
            }

            match self.encyclopedia.fetch_node(&member).await? {
                PageNode::Article(article) => return Ok(article),
                // The service disagrees with the title prefix; keep walking
                PageNode::Category(page) => current = page.title,
            }
        }

        Err(AttemptError::DescentExhausted)
    }
}
