//! The `quiztime validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quiztime_core::catalog::{validate_catalog, Catalog};
use quiztime_core::model::QuestionType;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalog = Catalog::load(&catalog_path)?;
    let selectable = catalog
        .questions()
        .iter()
        .filter(|q| q.question_type != QuestionType::AiAgent)
        .count();

    println!(
        "Catalog: {} ({} questions, {} selectable)",
        catalog_path.display(),
        catalog.len(),
        selectable
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
