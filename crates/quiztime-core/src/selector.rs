//! Question selection, exact-match grading and score calculation.
//!
//! Selection draws from an injected random source so sessions can be replayed
//! with a seeded generator.

use std::collections::BTreeSet;

use rand::Rng;

use crate::catalog::Catalog;
use crate::error::QuizError;
use crate::model::{ExperienceLevel, Question, QuestionType, TimeLimit};

/// Selects questions from a fixed catalog.
#[derive(Debug, Clone)]
pub struct QuizService {
    catalog: Catalog,
}

impl QuizService {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every tag used anywhere in the catalog, sorted and de-duplicated.
    pub fn all_tags(&self) -> Vec<String> {
        self.catalog
            .questions()
            .iter()
            .flat_map(|q| q.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Pick a question uniformly at random from those matching the filters.
    ///
    /// `ai-agent` questions are never offered. A question qualifies when its
    /// level is at or below `experience_level`, it shares at least one tag
    /// with `tags` (ignored when empty), and its id is not in `exclude_ids`.
    pub fn random_question<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        experience_level: Option<ExperienceLevel>,
        tags: &[String],
        exclude_ids: &[u32],
    ) -> Result<&Question, QuizError> {
        let candidates: Vec<&Question> = self
            .catalog
            .questions()
            .iter()
            .filter(|q| q.question_type != QuestionType::AiAgent)
            .filter(|q| experience_level.map_or(true, |max| q.experience_level <= max))
            .filter(|q| tags.is_empty() || q.has_any_tag(tags))
            .filter(|q| !exclude_ids.contains(&q.id))
            .collect();

        if candidates.is_empty() {
            tracing::debug!(
                ?experience_level,
                tags = tags.len(),
                excluded = exclude_ids.len(),
                "question pool exhausted"
            );
            return Err(QuizError::NoCandidates);
        }

        let roll: f64 = rng.gen();
        let index = ((roll * candidates.len() as f64).floor() as usize).min(candidates.len() - 1);
        Ok(candidates[index])
    }
}

/// Case-insensitive exact match of a player's answer.
///
/// Only the player's input is trimmed. Accepted answers are lowercased but
/// compared as written, so one stored with surrounding whitespace can never
/// match.
pub fn check_answer(user_answer: &str, correct_answers: &[String]) -> bool {
    let normalized = user_answer.trim().to_lowercase();
    correct_answers
        .iter()
        .any(|answer| answer.to_lowercase() == normalized)
}

/// 1.0 for levels 1-2, 1.3 for levels 3-4, 1.6 for level 5.
pub fn experience_multiplier(level: ExperienceLevel) -> f64 {
    match level.get() {
        0..=2 => 1.0,
        3..=4 => 1.3,
        _ => 1.6,
    }
}

/// Shorter limits pay more. No limit pays the same as the most lenient one.
pub fn time_limit_multiplier(time_limit: Option<TimeLimit>) -> f64 {
    match time_limit {
        Some(TimeLimit::Ten) => 1.6,
        Some(TimeLimit::Fifteen) => 1.3,
        Some(TimeLimit::Twenty) | None => 1.0,
    }
}

/// Linear bonus from 1.0 (no time left) to 2.0 (all time left).
pub fn speed_bonus(time_remaining_percentage: f64) -> f64 {
    1.0 + time_remaining_percentage / 100.0
}

/// Final points for a correct answer, rounded half-up.
///
/// Inputs are not validated; a percentage outside `[0, 100]` simply feeds
/// through the arithmetic.
pub fn calculate_score(
    base_points: u32,
    experience_level: ExperienceLevel,
    time_remaining_percentage: f64,
    time_limit: Option<TimeLimit>,
) -> i64 {
    let raw = f64::from(base_points)
        * experience_multiplier(experience_level)
        * time_limit_multiplier(time_limit)
        * speed_bonus(time_remaining_percentage);
    (raw + 0.5).floor() as i64
}
