//! Gather Dataset use case.
//!
//! Drives the end-to-end pipeline per target question: sample an unseen
//! article, request question records from the completion service, validate
//! and repair the structured response under a bounded retry budget, then
//! checkpoint the accumulated dataset and seen-pages set before moving on.
//! A crash therefore loses at most the article currently in flight.
//!
//! Retry policy: transport failures and malformed responses share one
//! global attempt budget. An article that exhausts the budget is abandoned
//! *and still marked seen*. That trades one good article wasted on a bad
//! run of responses for the guarantee that a systematically malformed
//! article can never stall the run (or a resumed run) forever.

use crate::config::GenerationParams;
use crate::ports::checkpoint::{CheckpointError, CheckpointStore};
use crate::ports::completion::{CompletionPort, CompletionRequest};
use crate::ports::encyclopedia::EncyclopediaPort;
use crate::ports::observer::{NoRunObserver, RunEvent, RunObserver};
use crate::use_cases::sample_article::{SampleArticleUseCase, SampleError};
use quizsmith_domain::{
    MultipleChoiceQuestion, ParsedQuestion, Provenance, SeenPages, Taxonomy, parse_completion,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that end the run.
#[derive(Error, Debug)]
pub enum GatherError {
    /// Checkpoint writes must never fail silently; everything accepted so
    /// far is already durable, the article in flight is lost.
    #[error("Checkpoint write failed: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Sampling failed: {0}")]
    Sampling(#[from] SampleError),
}

/// Input for the [`GatherDatasetUseCase`].
#[derive(Debug, Clone)]
pub struct GatherInput {
    pub taxonomy: Taxonomy,
    pub params: GenerationParams,
    /// Questions to accept before the run is complete (new ones, on top of
    /// any preloaded checkpoint).
    pub target_count: u64,
    pub seed: u64,
    /// Seen pages preloaded from a previous run's checkpoint.
    pub seen_pages: SeenPages,
    /// Questions preloaded from a previous run's checkpoint.
    pub questions: Vec<MultipleChoiceQuestion>,
}

impl GatherInput {
    pub fn new(taxonomy: Taxonomy, params: GenerationParams, target_count: u64, seed: u64) -> Self {
        Self {
            taxonomy,
            params,
            target_count,
            seed,
            seen_pages: SeenPages::new(),
            questions: Vec::new(),
        }
    }

    /// Resume from checkpointed state. Per the resumption contract, `seed`
    /// should be one less than the value logged with the last accepted
    /// question; the logged value already anticipates the loop's own
    /// pre-increment.
    pub fn resuming(mut self, seen_pages: SeenPages, questions: Vec<MultipleChoiceQuestion>) -> Self {
        self.seen_pages = seen_pages;
        self.questions = questions;
        self
    }
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherOutcome {
    /// The target count was reached.
    Complete,
    /// The defensive iteration ceiling was hit before the target count.
    Exhausted { iterations: u64 },
}

/// Result of a gather run. Everything in here is also in the checkpoint
/// store as of the last completed article.
#[derive(Debug)]
pub struct GatherReport {
    pub questions: Vec<MultipleChoiceQuestion>,
    pub seen_pages: SeenPages,
    /// Running value of the attempt counter at each failed attempt.
    pub attempts_log: Vec<u64>,
    pub outcome: GatherOutcome,
}

/// Resumable counters: accepted questions, completion retries (global
/// across articles), and outer-loop iterations.
#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    generated: u64,
    attempts: u64,
    iterations: u64,
}

/// Terminal state of one article's request/validate cycle.
enum ArticleOutcome {
    Accepted(Vec<ParsedQuestion>),
    Abandoned,
}

/// Use case for gathering a multiple-choice-question dataset.
pub struct GatherDatasetUseCase {
    sampler: SampleArticleUseCase,
    completion: Arc<dyn CompletionPort>,
    checkpoint: Arc<dyn CheckpointStore>,
    observer: Arc<dyn RunObserver>,
}

impl GatherDatasetUseCase {
    pub fn new(
        encyclopedia: Arc<dyn EncyclopediaPort>,
        completion: Arc<dyn CompletionPort>,
        checkpoint: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            sampler: SampleArticleUseCase::new(encyclopedia),
            completion,
            checkpoint,
            observer: Arc::new(NoRunObserver),
        }
    }

    /// Attach a run observer.
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the generation loop until `target_count` new questions are
    /// accepted, the iteration ceiling is hit, or a fatal error occurs.
    pub async fn execute(&self, input: GatherInput) -> Result<GatherReport, GatherError> {
        let GatherInput {
            taxonomy,
            params,
            target_count,
            seed: base_seed,
            seen_pages: mut seen,
            mut questions,
        } = input;

        let mut counters = Counters::default();
        let mut attempts_log = Vec::new();
        let ceiling = params.iteration_ceiling(target_count);
        let mut seed = base_seed;

        self.observer.record(RunEvent::new(
            "run_started",
            json!({
                "seed": base_seed,
                "target_count": target_count,
                "preloaded_questions": questions.len(),
                "preloaded_seen_pages": seen.len(),
            }),
        ));

        let outcome = loop {
            if counters.generated >= target_count {
                break GatherOutcome::Complete;
            }
            counters.iterations += 1;
            if counters.iterations > ceiling {
                warn!(
                    iterations = counters.iterations - 1,
                    generated = counters.generated,
                    "Generation stalled, giving up"
                );
                break GatherOutcome::Exhausted {
                    iterations: counters.iterations - 1,
                };
            }

            info!(generated = counters.generated, "Selecting next article");

            // Advanced before anything that can fail, so replaying a logged
            // seed reproduces the same attempt sequence.
            seed = seed
                .wrapping_add(counters.generated)
                .wrapping_add(counters.attempts)
                .wrapping_add(counters.iterations);

            let article = self
                .sampler
                .execute(&taxonomy, &params, &seen, seed)
                .await?;

            info!(
                page_id = article.page_id,
                title = %article.title,
                topic = %article.topic,
                "Start question generation"
            );
            self.observer.record(RunEvent::new(
                "article_selected",
                json!({
                    "page_id": article.page_id,
                    "title": article.title,
                    "topic": article.topic.as_str(),
                }),
            ));

            let request = CompletionRequest {
                system_prompt: params.system_prompt.clone(),
                user_payload: format!(
                    "{delimiter}{excerpt}{delimiter}",
                    delimiter = params.delimiter,
                    excerpt = article.excerpt
                ),
                model: params.model.clone(),
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            };

            match self
                .request_questions(&request, &params, &mut counters, &mut attempts_log)
                .await
            {
                ArticleOutcome::Accepted(parsed) => {
                    let provenance = Provenance {
                        excerpt: article.excerpt.clone(),
                        page_id: article.page_id,
                        page_title: article.title.clone(),
                        topic: article.topic.clone(),
                    };
                    questions.extend(
                        parsed
                            .into_iter()
                            .map(|p| p.into_question(provenance.clone())),
                    );

                    self.checkpoint.save_questions(&questions)?;
                    seen.insert(article.page_id);
                    counters.generated += 1;

                    // The seed a resumed run needs (minus one) to replay
                    // from here.
                    info!(seed, generated = counters.generated, "Question accepted");
                    self.observer.record(RunEvent::new(
                        "question_accepted",
                        json!({
                            "page_id": article.page_id,
                            "title": article.title,
                            "topic": article.topic.as_str(),
                            "seed": seed,
                            "generated": counters.generated,
                        }),
                    ));
                }
                ArticleOutcome::Abandoned => {
                    // Marked seen anyway: abandoned articles must never be
                    // retried, or one bad article could stall every resume.
                    seen.insert(article.page_id);
                    warn!(
                        page_id = article.page_id,
                        attempts = counters.attempts,
                        "Retry budget exhausted, abandoning article"
                    );
                    self.observer.record(RunEvent::new(
                        "article_abandoned",
                        json!({
                            "page_id": article.page_id,
                            "title": article.title,
                            "attempts": counters.attempts,
                        }),
                    ));
                }
            }

            self.checkpoint.save_seen_pages(&seen)?;
        };

        self.observer.record(RunEvent::new(
            "run_finished",
            json!({
                "generated": counters.generated,
                "attempts": counters.attempts,
                "iterations": counters.iterations,
                "complete": outcome == GatherOutcome::Complete,
            }),
        ));

        Ok(GatherReport {
            questions,
            seen_pages: seen,
            attempts_log,
            outcome,
        })
    }

    /// Request/validate cycle for one article, bounded by the shared
    /// attempt budget.
    async fn request_questions(
        &self,
        request: &CompletionRequest,
        params: &GenerationParams,
        counters: &mut Counters,
        attempts_log: &mut Vec<u64>,
    ) -> ArticleOutcome {
        loop {
            let failure = match self.completion.complete(request).await {
                Ok(raw) => match parse_completion(&raw) {
                    Ok(parsed) => return ArticleOutcome::Accepted(parsed),
                    Err(err) => format!("invalid response: {err}"),
                },
                Err(err) => format!("completion failed: {err}"),
            };

            counters.attempts += 1;
            attempts_log.push(counters.attempts);
            warn!(
                attempts = counters.attempts,
                failure = %failure,
                "Completion attempt failed"
            );
            self.observer.record(RunEvent::new(
                "attempt_failed",
                json!({
                    "attempts": counters.attempts,
                    "reason": failure,
                }),
            ));

            if counters.attempts > params.max_completion_attempts {
                return ArticleOutcome::Abandoned;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion::CompletionError;
    use crate::ports::encyclopedia::{ArticlePage, CategoryPage, EncyclopediaError, PageNode};
    use async_trait::async_trait;
    use quizsmith_domain::{AnswerKey, Topic};
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct FixtureEncyclopedia {
        nodes: HashMap<String, PageNode>,
    }

    impl FixtureEncyclopedia {
        fn new(nodes: Vec<PageNode>) -> Self {
            let nodes = nodes
                .into_iter()
                .map(|node| {
                    let title = match &node {
                        PageNode::Category(page) => page.title.clone(),
                        PageNode::Article(article) => article.title.clone(),
                    };
                    (title, node)
                })
                .collect();
            Self { nodes }
        }
    }

    #[async_trait]
    impl crate::ports::encyclopedia::EncyclopediaPort for FixtureEncyclopedia {
        async fn fetch_node(&self, title: &str) -> Result<PageNode, EncyclopediaError> {
            self.nodes
                .get(title)
                .cloned()
                .ok_or_else(|| EncyclopediaError::NotFound(title.to_string()))
        }
    }

    /// Scripted completion service: pops queued responses, then falls back
    /// to a default (or a service error when there is none).
    struct MockCompletion {
        responses: Mutex<VecDeque<Result<String, CompletionError>>>,
        fallback: Option<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockCompletion {
        fn scripted(responses: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn always(response: &str) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: Some(response.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionPort for MockCompletion {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(response) = self.responses.lock().unwrap().pop_front() {
                return response;
            }
            match &self.fallback {
                Some(response) => Ok(response.clone()),
                None => Err(CompletionError::Service {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct MemoryCheckpoint {
        questions: Mutex<Option<Vec<MultipleChoiceQuestion>>>,
        seen: Mutex<Option<SeenPages>>,
        fail_saves: bool,
    }

    impl MemoryCheckpoint {
        fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }
    }

    impl CheckpointStore for MemoryCheckpoint {
        fn save_questions(
            &self,
            questions: &[MultipleChoiceQuestion],
        ) -> Result<(), CheckpointError> {
            if self.fail_saves {
                return Err(CheckpointError::Io(std::io::Error::other("disk full")));
            }
            *self.questions.lock().unwrap() = Some(questions.to_vec());
            Ok(())
        }

        fn load_questions(&self) -> Result<Option<Vec<MultipleChoiceQuestion>>, CheckpointError> {
            Ok(self.questions.lock().unwrap().clone())
        }

        fn save_seen_pages(&self, seen: &SeenPages) -> Result<(), CheckpointError> {
            if self.fail_saves {
                return Err(CheckpointError::Io(std::io::Error::other("disk full")));
            }
            *self.seen.lock().unwrap() = Some(seen.clone());
            Ok(())
        }

        fn load_seen_pages(&self) -> Result<Option<SeenPages>, CheckpointError> {
            Ok(self.seen.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct CollectingObserver {
        events: Mutex<Vec<(&'static str, serde_json::Value)>>,
    }

    impl CollectingObserver {
        fn event_types(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }

        fn count(&self, event_type: &str) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| *t == event_type)
                .count()
        }
    }

    impl RunObserver for CollectingObserver {
        fn record(&self, event: RunEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    // ==================== Fixtures ====================

    fn category(title: &str, members: &[&str]) -> PageNode {
        PageNode::Category(CategoryPage {
            title: title.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        })
    }

    fn article(title: &str, page_id: u64) -> PageNode {
        let text = (1..=10)
            .map(|i| format!("Sentence {i}"))
            .collect::<Vec<_>>()
            .join(". ");
        PageNode::Article(ArticlePage {
            page_id,
            title: title.to_string(),
            text,
        })
    }

    fn one_article_tree() -> Vec<PageNode> {
        vec![
            category("Category:Fields_of_mathematics", &["Category:Geometry"]),
            category("Category:Geometry", &["Pythagorean theorem"]),
            article("Pythagorean theorem", 42),
        ]
    }

    fn many_article_tree(count: u64) -> Vec<PageNode> {
        let titles: Vec<String> = (1..=count).map(|i| format!("Article {i}")).collect();
        let mut nodes = vec![category(
            "Category:Fields_of_mathematics",
            &titles.iter().map(String::as_str).collect::<Vec<_>>(),
        )];
        nodes.extend(titles.iter().enumerate().map(|(i, t)| article(t, i as u64 + 1)));
        nodes
    }

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(
            vec![Topic::new(
                "M",
                1.0,
                vec!["Category:Fields_of_mathematics".to_string()],
            )],
            HashSet::new(),
        )
        .unwrap()
    }

    fn params() -> GenerationParams {
        GenerationParams::default().with_max_sample_attempts(50)
    }

    fn good_response() -> String {
        r#"[{
            "question": "What does the theorem relate?",
            "option_1": "Angles",
            "option_2": "Side lengths",
            "option_3": "Areas only",
            "option_4": "Volumes",
            "option_5": "Perimeters",
            "answer": "option_2"
        }]"#
        .to_string()
    }

    fn response_missing_answer() -> String {
        r#"[{
            "question": "What does the theorem relate?",
            "option_1": "Angles",
            "option_2": "Side lengths",
            "option_3": "Areas only",
            "option_4": "Volumes",
            "option_5": "Perimeters"
        }]"#
        .to_string()
    }

    struct Harness {
        completion: Arc<MockCompletion>,
        checkpoint: Arc<MemoryCheckpoint>,
        observer: Arc<CollectingObserver>,
        use_case: GatherDatasetUseCase,
    }

    fn harness(tree: Vec<PageNode>, completion: MockCompletion) -> Harness {
        let completion = Arc::new(completion);
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        let observer = Arc::new(CollectingObserver::default());
        let use_case = GatherDatasetUseCase::new(
            Arc::new(FixtureEncyclopedia::new(tree)),
            completion.clone(),
            checkpoint.clone(),
        )
        .with_observer(observer.clone());
        Harness {
            completion,
            checkpoint,
            observer,
            use_case,
        }
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_generates_target_count_questions() {
        let h = harness(one_article_tree(), MockCompletion::always(&good_response()));
        let input = GatherInput::new(taxonomy(), params(), 1, 0);

        let report = h.use_case.execute(input).await.unwrap();

        assert_eq!(report.outcome, GatherOutcome::Complete);
        assert_eq!(report.questions.len(), 1);
        assert!(report.attempts_log.is_empty());

        let question = &report.questions[0];
        assert_eq!(question.page_id, 42);
        assert_eq!(question.page_title, "Pythagorean theorem");
        assert_eq!(question.topic.as_str(), "M");
        assert_eq!(question.answer, AnswerKey::Option2);
        assert!(question.excerpt.starts_with("Sentence 1. "));

        assert!(report.seen_pages.contains(42));
        // Both slots checkpointed
        assert_eq!(h.checkpoint.load_questions().unwrap().unwrap().len(), 1);
        assert!(h.checkpoint.load_seen_pages().unwrap().unwrap().contains(42));
        assert_eq!(h.observer.count("question_accepted"), 1);
    }

    #[tokio::test]
    async fn test_user_payload_is_delimited_excerpt() {
        let h = harness(one_article_tree(), MockCompletion::always(&good_response()));
        let input = GatherInput::new(taxonomy(), params(), 1, 0);

        h.use_case.execute(input).await.unwrap();

        let requests = h.completion.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user_payload.starts_with("####Sentence 1. "));
        assert!(requests[0].user_payload.ends_with("Sentence 7.####"));
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_malformed_response_retries_within_budget() {
        let h = harness(
            one_article_tree(),
            MockCompletion::scripted(vec![Ok(response_missing_answer()), Ok(good_response())]),
        );
        let input = GatherInput::new(taxonomy(), params(), 1, 0);

        let report = h.use_case.execute(input).await.unwrap();

        assert_eq!(report.outcome, GatherOutcome::Complete);
        assert_eq!(report.questions.len(), 1);
        // One failed attempt, then success
        assert_eq!(report.attempts_log, vec![1]);
        assert_eq!(h.observer.count("attempt_failed"), 1);
        assert_eq!(h.completion.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_budget_abandons_article_and_marks_it_seen() {
        let h = harness(one_article_tree(), MockCompletion::failing());
        let mut p = params();
        p.max_completion_attempts = 2;
        let input = GatherInput::new(taxonomy(), p, 1, 0);

        let result = h.use_case.execute(input).await;

        // The lone article was abandoned after 3 attempts (initial + 2
        // retries); with nothing left to sample the run fails.
        assert!(matches!(
            result,
            Err(GatherError::Sampling(SampleError::Exhausted(_)))
        ));
        assert_eq!(h.completion.requests().len(), 3);
        assert_eq!(h.observer.count("attempt_failed"), 3);
        assert_eq!(h.observer.count("article_abandoned"), 1);
        // Abandonment was persisted before the run failed
        assert!(h.checkpoint.load_seen_pages().unwrap().unwrap().contains(42));
        assert!(h.checkpoint.load_questions().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_runs_with_same_seed_produce_identical_datasets() {
        let mut reports = Vec::new();
        for _ in 0..2 {
            let h = harness(many_article_tree(8), MockCompletion::always(&good_response()));
            let input = GatherInput::new(taxonomy(), params(), 3, 11);
            reports.push(h.use_case.execute(input).await.unwrap());
        }
        assert_eq!(reports[0].questions, reports[1].questions);
        assert_eq!(reports[0].seen_pages, reports[1].seen_pages);
    }

    #[tokio::test]
    async fn test_iteration_ceiling_halts_a_stalled_run() {
        let h = harness(many_article_tree(20), MockCompletion::failing());
        let mut p = params();
        // Abandon each article after its first failed attempt, and stop
        // the whole run after 3 outer iterations
        p.max_completion_attempts = 0;
        p.iteration_ceiling_factor = 3;
        let input = GatherInput::new(taxonomy(), p, 1, 0);

        let report = h.use_case.execute(input).await.unwrap();

        assert_eq!(report.outcome, GatherOutcome::Exhausted { iterations: 3 });
        assert!(report.questions.is_empty());
        assert_eq!(report.seen_pages.len(), 3);
        assert_eq!(h.observer.count("article_abandoned"), 3);
    }

    #[tokio::test]
    async fn test_checkpoint_write_failure_is_fatal() {
        let completion = Arc::new(MockCompletion::always(&good_response()));
        let use_case = GatherDatasetUseCase::new(
            Arc::new(FixtureEncyclopedia::new(one_article_tree())),
            completion,
            Arc::new(MemoryCheckpoint::failing()),
        );
        let input = GatherInput::new(taxonomy(), params(), 1, 0);

        let result = use_case.execute(input).await;
        assert!(matches!(result, Err(GatherError::Checkpoint(_))));
    }

    #[tokio::test]
    async fn test_resumed_run_skips_seen_pages_and_keeps_old_questions() {
        let h = harness(many_article_tree(2), MockCompletion::always(&good_response()));

        // First run: accept one question
        let first = h
            .use_case
            .execute(GatherInput::new(taxonomy(), params(), 1, 0))
            .await
            .unwrap();
        assert_eq!(first.questions.len(), 1);
        let first_page = first.questions[0].page_id;

        // Resume with the first run's state; only the other article is left
        let input = GatherInput::new(taxonomy(), params(), 1, 100)
            .resuming(first.seen_pages.clone(), first.questions.clone());
        let second = h.use_case.execute(input).await.unwrap();

        assert_eq!(second.questions.len(), 2);
        let second_page = second.questions[1].page_id;
        assert_ne!(first_page, second_page);
        assert_eq!(second.seen_pages.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_target_completes_without_fetching() {
        let h = harness(one_article_tree(), MockCompletion::failing());
        let input = GatherInput::new(taxonomy(), params(), 0, 0);

        let report = h.use_case.execute(input).await.unwrap();

        assert_eq!(report.outcome, GatherOutcome::Complete);
        assert!(report.questions.is_empty());
        assert!(h.completion.requests().is_empty());
        assert_eq!(h.observer.event_types(), vec!["run_started", "run_finished"]);
    }
}
