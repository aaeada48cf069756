//! Core trait definitions for answer graders.
//!
//! The exact-match grader lives here; the remote grader is implemented by the
//! `quiztime-grader` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Question;
use crate::selector::check_answer;

// ---------------------------------------------------------------------------
// Answer grader trait
// ---------------------------------------------------------------------------

/// Trait for backends that judge whether a player's answer is correct.
#[async_trait]
pub trait AnswerGrader: Send + Sync {
    /// Human-readable grader name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Judge a single answer. Every call is independent; nothing is cached.
    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<bool>;
}

/// A single answer to be judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    /// The question prompt as shown to the player.
    pub question: String,
    /// The player's raw answer.
    pub user_answer: String,
    /// Accepted answers from the catalog.
    pub correct_answers: Vec<String>,
}

impl GradeRequest {
    pub fn for_question(question: &Question, user_answer: &str) -> Self {
        Self {
            question: question.question.clone(),
            user_answer: user_answer.to_string(),
            correct_answers: question.correct_answers.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Local grader
// ---------------------------------------------------------------------------

/// Grades locally by case-insensitive exact match. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatchGrader;

#[async_trait]
impl AnswerGrader for ExactMatchGrader {
    fn name(&self) -> &str {
        "exact"
    }

    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<bool> {
        Ok(check_answer(&request.user_answer, &request.correct_answers))
    }
}
