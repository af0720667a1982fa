//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for quizsmith
#[derive(Parser, Debug)]
#[command(name = "quizsmith")]
#[command(author, version, about = "Generate a multiple-choice-question dataset from encyclopedia articles")]
#[command(long_about = r#"
Quizsmith samples articles from a curated set of encyclopedia topic
categories, asks a completion model to turn each excerpt into a
multiple-choice question, and writes the result as a CSV dataset.

Progress is checkpointed after every accepted question. If a run dies,
restart with --resume-date <DATE> of the crashed run and --seed set to
one less than the seed logged with the last accepted question (see the
run_<date>.jsonl log in the output directory).

Configuration files are loaded from (in priority order):
1. QUIZSMITH_* environment variables
2. --config <path>       Explicit config file
3. ./quizsmith.toml      Project-level config
4. ~/.config/quizsmith/config.toml   Global config

Example:
  quizsmith --count 25
  quizsmith --count 100 --model gpt-4o-mini --seed 7
  quizsmith --resume-date 2024-06-01 --seed 2041 --count 60
"#)]
pub struct Cli {
    /// Number of questions to generate in this run
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: u64,

    /// Base seed for the category walk
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Resume from the checkpoints of a previous run date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub resume_date: Option<String>,

    /// Output directory (overrides the configured one)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Completion model (overrides the configured one)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the header and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
