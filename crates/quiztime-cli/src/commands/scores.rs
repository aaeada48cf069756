//! The `quiztime scores` and `quiztime clear-scores` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quiztime_core::ledger::ScoreLedger;
use quiztime_core::model::{GameMode, ScoreEntry};
use quiztime_grader::config::load_config_from;

use super::open_store;

pub fn execute(
    mode: Option<GameMode>,
    limit: usize,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let ledger = ScoreLedger::new(open_store(data_dir, &config));

    let entries = match mode {
        Some(mode) => ledger.top_scores(mode, limit)?,
        None => {
            let mut all = ledger.scores(None)?;
            all.sort_by(|a, b| b.score.cmp(&a.score));
            all.truncate(limit);
            all
        }
    };

    if entries.is_empty() {
        println!("No scores recorded yet.");
        return Ok(());
    }

    print_table(&entries);
    Ok(())
}

pub fn clear(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    ScoreLedger::new(open_store(data_dir, &config)).clear_scores()?;
    println!("All scores cleared.");
    Ok(())
}

fn print_table(entries: &[ScoreEntry]) {
    let mut table = Table::new();
    table.set_header(vec!["Rank", "Name", "Score", "Mode", "Date"]);

    for (rank, entry) in entries.iter().enumerate() {
        // Dates are stored as full timestamps; the day is enough here.
        let day = entry.date.get(..10).unwrap_or(&entry.date);
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.name),
            Cell::new(entry.score),
            Cell::new(entry.mode),
            Cell::new(day),
        ]);
    }

    println!("{table}");
}
