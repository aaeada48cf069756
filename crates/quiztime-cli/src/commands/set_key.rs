//! The `quiztime set-key` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_grader::config::load_config_from;
use quiztime_grader::GeminiGrader;

use super::open_store;

pub fn execute(key: String, data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let key = key.trim();
    anyhow::ensure!(!key.is_empty(), "API key must not be empty");

    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(data_dir, &config);
    let grader = GeminiGrader::from_config(&config.gemini, store)?;
    grader.set_api_key(key)?;

    println!("Gemini API key saved.");
    Ok(())
}
