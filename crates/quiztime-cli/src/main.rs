//! quiztime CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use quiztime_core::model::{ExperienceLevel, GameMode, TimeLimit};

mod commands;

#[derive(Parser)]
#[command(name = "quiztime", version, about = "Timed programming quiz in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz session, reading answers from stdin
    Play {
        /// Game mode: continuous, challenge-5, challenge-10, challenge-15
        #[arg(long)]
        mode: Option<GameMode>,

        /// Seconds per question: 10, 15 or 20
        #[arg(long)]
        time_limit: Option<TimeLimit>,

        /// Highest experience level to ask (1-5)
        #[arg(long)]
        level: Option<ExperienceLevel>,

        /// Only ask questions with one of these tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Record the final score under this name
        #[arg(long)]
        name: Option<String>,

        /// Grade answers with the Gemini API
        #[arg(long)]
        ai_grading: bool,

        /// Seed for question order
        #[arg(long)]
        seed: Option<u64>,

        /// Question catalog JSON file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory holding scores and the API key
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every tag in the catalog
    Tags {
        /// Question catalog JSON file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show high scores
    Scores {
        /// Only show this game mode
        #[arg(long)]
        mode: Option<GameMode>,

        /// Maximum entries to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Directory holding scores and the API key
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete all recorded scores
    ClearScores {
        /// Directory holding scores and the API key
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Save the Gemini API key used for AI grading
    SetKey {
        /// The API key
        key: String,

        /// Directory holding scores and the API key
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question catalog
    Validate {
        /// Question catalog JSON file
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Create a starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quiztime=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            mode,
            time_limit,
            level,
            tags,
            name,
            ai_grading,
            seed,
            catalog,
            data_dir,
            config,
        } => {
            commands::play::execute(
                mode, time_limit, level, tags, name, ai_grading, seed, catalog, data_dir, config,
            )
            .await
        }
        Commands::Tags { catalog, config } => commands::tags::execute(catalog, config),
        Commands::Scores {
            mode,
            limit,
            data_dir,
            config,
        } => commands::scores::execute(mode, limit, data_dir, config),
        Commands::ClearScores { data_dir, config } => commands::scores::clear(data_dir, config),
        Commands::SetKey {
            key,
            data_dir,
            config,
        } => commands::set_key::execute(key, data_dir, config),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
