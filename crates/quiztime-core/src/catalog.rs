//! JSON question catalog loader.
//!
//! Loads the static question catalog, enforces its hard invariants and
//! reports softer problems as warnings.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{Question, QuestionType};

const BUILTIN_CATALOG: &str = include_str!("../data/questions.json");

/// The static, read-only set of questions available for selection.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    questions: Vec<Question>,
}

/// On-disk layout: `{"questions": [...]}`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog, rejecting empty answer lists and duplicate ids.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        let mut seen_ids = HashSet::new();
        for q in &questions {
            if !seen_ids.insert(q.id) {
                return Err(QuizError::InvalidCatalog(format!(
                    "duplicate question id: {}",
                    q.id
                )));
            }
            if q.correct_answers.is_empty() {
                return Err(QuizError::InvalidCatalog(format!(
                    "question {} has no accepted answers",
                    q.id
                )));
            }
        }
        Ok(Self { questions })
    }

    /// The catalog bundled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG, Path::new("<builtin>"))
    }

    /// Parse a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

        Self::from_json_str(&content, path)
    }

    /// Parse a catalog from a JSON string (useful for testing).
    pub fn from_json_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: CatalogFile = serde_json::from_str(content)
            .with_context(|| format!("failed to parse catalog JSON: {}", source_path.display()))?;

        let catalog = Self::new(parsed.questions)
            .with_context(|| format!("invalid catalog: {}", source_path.display()))?;
        tracing::debug!(
            source = %source_path.display(),
            questions = catalog.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for problems that don't prevent loading.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Accepted answers are never trimmed before comparison
    for q in catalog.questions() {
        for answer in &q.correct_answers {
            if answer.trim() != answer {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!(
                        "accepted answer {answer:?} has surrounding whitespace and can never match"
                    ),
                });
            }
        }
    }

    for q in catalog.questions() {
        if q.tags.is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "question has no tags and is hidden by any tag filter".into(),
            });
        }
    }

    for q in catalog.questions() {
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "question text is empty".into(),
            });
        }
    }

    let selectable = catalog
        .questions()
        .iter()
        .filter(|q| q.question_type != QuestionType::AiAgent)
        .count();
    if selectable == 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "no selectable questions (ai-agent questions are never offered)".into(),
        });
    }

    warnings
}
