//! CLI entrypoint for quizsmith
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;

use anyhow::{Context, Result, bail};
use clap::Parser;
use commands::Cli;
use quizsmith_application::{CheckpointStore, GatherDatasetUseCase, GatherInput, GatherOutcome};
use quizsmith_domain::{SeenPages, to_dataset};
use quizsmith_infrastructure::{
    ConfigLoader, FileCheckpointStore, JsonlRunObserver, MediaWikiClient, OpenAiCompletionClient,
    run_date_today, write_dataset_csv,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let taxonomy = config
        .taxonomy
        .to_taxonomy()
        .context("Invalid taxonomy configuration")?;

    let mut params = config.to_params();
    if let Some(model) = &cli.model {
        params.model = model.clone();
    }

    let Some(api_key) = config.completion.resolve_api_key() else {
        bail!(
            "No completion API key configured. \
             Set completion.api_key in the config file or the OPENAI_API_KEY environment variable."
        );
    };

    let output_dir = cli.output_dir.unwrap_or_else(|| config.output.dir.clone());
    let run_date = run_date_today();

    info!("Starting quizsmith run for {}", run_date);

    // === Dependency Injection ===
    let encyclopedia = Arc::new(MediaWikiClient::new(config.encyclopedia.api_url.as_str()));
    let completion = Arc::new(OpenAiCompletionClient::new(
        config.completion.base_url.as_str(),
        api_key,
    ));
    let checkpoint = Arc::new(FileCheckpointStore::new(&output_dir, &run_date));

    // Preload checkpointed state when resuming
    let (seen_pages, questions) = match &cli.resume_date {
        Some(date) => {
            let previous = FileCheckpointStore::new(&output_dir, date);
            let seen = previous
                .load_seen_pages()
                .context("Failed to load seen-pages checkpoint")?
                .unwrap_or_default();
            let questions = previous
                .load_questions()
                .context("Failed to load questions checkpoint")?
                .unwrap_or_default();
            info!(
                "Resuming from {}: {} questions, {} seen pages",
                date,
                questions.len(),
                seen.len()
            );
            (seen, questions)
        }
        None => (SeenPages::new(), Vec::new()),
    };

    let mut use_case = GatherDatasetUseCase::new(encyclopedia, completion, checkpoint);
    let log_path = output_dir.join(format!("run_{run_date}.jsonl"));
    if let Some(observer) = JsonlRunObserver::new(&log_path) {
        use_case = use_case.with_observer(Arc::new(observer));
    }

    // Print header
    if !cli.quiet {
        println!();
        println!("Quizsmith - encyclopedia MCQ dataset generator");
        println!(
            "Target: {} questions | Model: {} | Seed: {}",
            cli.count, params.model, cli.seed
        );
        println!("Output: {}", output_dir.display());
        println!();
    }

    // Execute the generation loop
    let input = GatherInput::new(taxonomy, params, cli.count, cli.seed)
        .resuming(seen_pages, questions);
    let report = use_case.execute(input).await?;

    // Write the dataset artifact
    let rows = to_dataset(&report.questions);
    let dataset_path = output_dir.join(format!("stem_dataset_{run_date}.csv"));
    write_dataset_csv(&dataset_path, &rows).context("Failed to write dataset")?;

    // Summary
    if !cli.quiet {
        println!("Questions: {}", report.questions.len());
        println!("Seen pages: {}", report.seen_pages.len());
        println!("Failed attempts: {}", report.attempts_log.len());
        println!("Dataset: {}", dataset_path.display());
        println!("Run log: {}", log_path.display());
    }

    if let GatherOutcome::Exhausted { iterations } = report.outcome {
        bail!(
            "Run stalled after {} iterations before reaching the target; \
             everything accepted so far is checkpointed and in the dataset.",
            iterations
        );
    }

    Ok(())
}
