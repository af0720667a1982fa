//! Application-level generation parameters.

/// Tunable parameters for sampling and question generation.
///
/// Constructed once (usually from the infrastructure config layer) and
/// passed explicitly into the use cases.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Minimum sentence units an article must split into to be usable.
    pub min_sentences: usize,
    /// Leading sentence units included in the excerpt.
    pub take_sentences: usize,
    /// Descent steps allowed inside one category before the attempt is
    /// abandoned and re-seeded.
    pub max_descent_steps: usize,
    /// Full sampling attempts before the sampler gives up for good.
    pub max_sample_attempts: usize,
    /// Completion retries shared across all articles of a run.
    pub max_completion_attempts: u64,
    /// Outer-loop iterations allowed per target question before the run is
    /// declared stalled.
    pub iteration_ceiling_factor: u64,
    /// System instruction sent with every completion request.
    pub system_prompt: String,
    /// Delimiter wrapped around the excerpt in the user payload.
    pub delimiter: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Default system instruction for question generation.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You will be provided with an encyclopedia excerpt delimited by #### characters.
Create one multiple choice question grounded in the excerpt, with exactly five answer options of which exactly one is correct.

Respond with a JSON array containing one object with exactly these keys:
"question", "option_1", "option_2", "option_3", "option_4", "option_5", "answer"

The "answer" value must be the key of the correct option (for example "option_3").
Respond with the JSON array only, no surrounding prose."#;

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            min_sentences: 3,
            take_sentences: 7,
            max_descent_steps: 100,
            max_sample_attempts: 1000,
            max_completion_attempts: 10,
            iteration_ceiling_factor: 64,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            delimiter: "####".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.8,
            max_tokens: 3000,
        }
    }
}

impl GenerationParams {
    pub fn with_max_completion_attempts(mut self, attempts: u64) -> Self {
        self.max_completion_attempts = attempts;
        self
    }

    pub fn with_max_sample_attempts(mut self, attempts: usize) -> Self {
        self.max_sample_attempts = attempts;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Iteration ceiling for a run targeting `target_count` questions.
    pub fn iteration_ceiling(&self, target_count: u64) -> u64 {
        self.iteration_ceiling_factor.saturating_mul(target_count.max(1))
    }
}
