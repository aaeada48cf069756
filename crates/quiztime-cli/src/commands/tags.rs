//! The `quiztime tags` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_core::selector::QuizService;
use quiztime_grader::config::load_config_from;

use super::load_catalog;

pub fn execute(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = QuizService::new(load_catalog(catalog_path.as_deref(), &config)?);

    let tags = quiz.all_tags();
    if tags.is_empty() {
        println!("No tags found.");
        return Ok(());
    }
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}
