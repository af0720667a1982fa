//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain/application
//! values (`Taxonomy`, `GenerationParams`) at startup.

use crate::completion::DEFAULT_BASE_URL;
use crate::encyclopedia::DEFAULT_API_URL;
use quizsmith_application::GenerationParams;
use quizsmith_domain::{Taxonomy, TaxonomyError, Topic};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Topic taxonomy driving the category walk
    pub taxonomy: FileTaxonomyConfig,
    /// Sampling and retry settings
    pub generation: FileGenerationConfig,
    /// Completion service settings
    pub completion: FileCompletionConfig,
    /// Encyclopedia service settings
    pub encyclopedia: FileEncyclopediaConfig,
    /// Output locations
    pub output: FileOutputConfig,
}

/// One `[[taxonomy.topics]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTopicConfig {
    pub label: String,
    pub weight: f64,
    pub seed_categories: Vec<String>,
}

/// `[taxonomy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTaxonomyConfig {
    pub topics: Vec<FileTopicConfig>,
    pub excluded_categories: Vec<String>,
}

impl Default for FileTaxonomyConfig {
    fn default() -> Self {
        let taxonomy = Taxonomy::default();
        Self {
            topics: taxonomy
                .topics()
                .iter()
                .map(|t| FileTopicConfig {
                    label: t.label.to_string(),
                    weight: t.weight,
                    seed_categories: t.seed_categories.clone(),
                })
                .collect(),
            excluded_categories: taxonomy.excluded_categories(),
        }
    }
}

impl FileTaxonomyConfig {
    /// Convert into the validated domain taxonomy.
    pub fn to_taxonomy(&self) -> Result<Taxonomy, TaxonomyError> {
        Taxonomy::new(
            self.topics
                .iter()
                .map(|t| Topic::new(t.label.as_str(), t.weight, t.seed_categories.clone()))
                .collect(),
            self.excluded_categories.iter().cloned().collect(),
        )
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub min_sentences: usize,
    pub take_sentences: usize,
    pub max_descent_steps: usize,
    pub max_sample_attempts: usize,
    pub max_completion_attempts: u64,
    pub iteration_ceiling_factor: u64,
    /// Overrides the built-in system prompt when set.
    pub system_prompt: Option<String>,
    pub delimiter: String,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            min_sentences: params.min_sentences,
            take_sentences: params.take_sentences,
            max_descent_steps: params.max_descent_steps,
            max_sample_attempts: params.max_sample_attempts,
            max_completion_attempts: params.max_completion_attempts,
            iteration_ceiling_factor: params.iteration_ceiling_factor,
            system_prompt: None,
            delimiter: params.delimiter,
        }
    }
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompletionConfig {
    /// API key; falls back to the `OPENAI_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for FileCompletionConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: params.model,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

impl FileCompletionConfig {
    /// Configured key, or the `OPENAI_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// `[encyclopedia]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEncyclopediaConfig {
    pub api_url: String,
}

impl Default for FileEncyclopediaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Directory for checkpoints, run logs, and the dataset artifact.
    pub dir: PathBuf,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl FileConfig {
    /// Assemble the application-level generation parameters.
    pub fn to_params(&self) -> GenerationParams {
        let defaults = GenerationParams::default();
        GenerationParams {
            min_sentences: self.generation.min_sentences,
            take_sentences: self.generation.take_sentences,
            max_descent_steps: self.generation.max_descent_steps,
            max_sample_attempts: self.generation.max_sample_attempts,
            max_completion_attempts: self.generation.max_completion_attempts,
            iteration_ceiling_factor: self.generation.iteration_ceiling_factor,
            system_prompt: self
                .generation
                .system_prompt
                .clone()
                .unwrap_or(defaults.system_prompt),
            delimiter: self.generation.delimiter.clone(),
            model: self.completion.model.clone(),
            temperature: self.completion.temperature,
            max_tokens: self.completion.max_tokens,
        }
    }
}
