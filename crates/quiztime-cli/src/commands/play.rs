//! The `quiztime play` command.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use quiztime_core::ledger::ScoreLedger;
use quiztime_core::model::{ExperienceLevel, GameMode, GameSettings, TimeLimit};
use quiztime_core::selector::QuizService;
use quiztime_core::session::{is_timed_out, time_remaining_percentage, GameSession};
use quiztime_core::traits::{AnswerGrader, ExactMatchGrader, GradeRequest};
use quiztime_grader::config::load_config_from;
use quiztime_grader::{GeminiGrader, GraderError};

use super::{load_catalog, open_store};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    mode: Option<GameMode>,
    time_limit: Option<TimeLimit>,
    level: Option<ExperienceLevel>,
    tags: Option<String>,
    name: Option<String>,
    ai_grading: bool,
    seed: Option<u64>,
    catalog_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(name) = &name {
        anyhow::ensure!(!name.trim().is_empty(), "player name must not be empty");
    }

    let config = load_config_from(config_path.as_deref())?;
    let quiz = QuizService::new(load_catalog(catalog_path.as_deref(), &config)?);
    let store = open_store(data_dir, &config);

    let settings = GameSettings {
        mode: mode.unwrap_or(config.default_mode),
        time_limit,
        experience_level: level,
        tags: tags
            .map(|t| {
                t.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    };

    let grader: Box<dyn AnswerGrader> = if ai_grading || config.ai_grading {
        let gemini = GeminiGrader::from_config(&config.gemini, store.clone())?;
        if !gemini.has_api_key()? {
            return Err(GraderError::CredentialMissing.into());
        }
        Box::new(gemini)
    } else {
        Box::new(ExactMatchGrader)
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!(mode = %settings.mode, grader = grader.name(), "starting session");
    print_banner(&settings);

    let mut session = GameSession::new(settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut grading_error = None;

    while !session.is_finished() {
        let question = match session.next_question(&quiz, &mut rng) {
            Ok(q) => q.clone(),
            Err(e) if e.is_pool_exhausted() => {
                println!("No more questions match your settings.");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let time_limit = session.settings().time_limit;
        println!();
        println!(
            "Question {} [level {}]{}",
            session.answered() + 1,
            question.experience_level,
            time_limit
                .map(|t| format!(" ({t} to answer)"))
                .unwrap_or_default()
        );
        println!("{}", question.question);
        print!("> ");
        std::io::stdout().flush()?;

        let started = Instant::now();
        let Some(answer) = lines.next_line().await? else {
            break;
        };
        let elapsed = started.elapsed();

        if answer.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        let correct = if is_timed_out(elapsed, time_limit) {
            println!("Time's up!");
            false
        } else {
            match grader
                .grade(&GradeRequest::for_question(&question, &answer))
                .await
            {
                Ok(correct) => correct,
                // The question stays unanswered; points so far are kept.
                Err(e) => {
                    tracing::warn!(error = %e, "grading failed, ending session");
                    grading_error = Some(e);
                    break;
                }
            }
        };

        let points = session.submit(
            &question,
            correct,
            time_remaining_percentage(elapsed, time_limit),
        );
        if correct {
            println!("Correct! +{points} points");
        } else {
            println!(
                "Wrong. Accepted answer: {}",
                question.correct_answers.join(" / ")
            );
        }
    }

    println!();
    println!(
        "Final score: {} ({} of {} correct)",
        session.total_score(),
        session.correct_count(),
        session.answered()
    );

    if let Some(name) = name {
        if session.answered() > 0 {
            let ledger = ScoreLedger::new(store);
            ledger.add_score(session.into_score_entry(name.trim()))?;
            println!("Score saved for {}.", name.trim());
        }
    }

    match grading_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_banner(settings: &GameSettings) {
    let length = settings
        .mode
        .question_count()
        .map(|n| format!("{n} questions"))
        .unwrap_or_else(|| "until you quit".to_string());
    println!("quiztime: {} ({length})", settings.mode);
    if !settings.tags.is_empty() {
        println!("Topics: {}", settings.tags.join(", "));
    }
    if let Some(level) = settings.experience_level {
        println!("Experience level: up to {level}");
    }
    println!("Type `quit` to stop.");
}
