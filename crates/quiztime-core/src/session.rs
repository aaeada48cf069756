//! A single play session: question draws without repeats, per-answer scoring
//! and the final score entry.

use std::time::Duration;

use rand::Rng;

use crate::error::QuizError;
use crate::model::{GameSettings, Question, ScoreEntry, TimeLimit};
use crate::selector::{calculate_score, QuizService};

/// Points awarded before multipliers for every correct answer.
pub const BASE_POINTS: u32 = 100;

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub question_id: u32,
    pub correct: bool,
    pub points: i64,
}

/// Tracks a session's shown questions and running score.
#[derive(Debug, Clone)]
pub struct GameSession {
    settings: GameSettings,
    shown_ids: Vec<u32>,
    outcomes: Vec<AnswerOutcome>,
}

impl GameSession {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            shown_ids: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Draw a question not yet shown in this session.
    pub fn next_question<'q, R: Rng + ?Sized>(
        &mut self,
        quiz: &'q QuizService,
        rng: &mut R,
    ) -> Result<&'q Question, QuizError> {
        let question = quiz.random_question(
            rng,
            self.settings.experience_level,
            &self.settings.tags,
            &self.shown_ids,
        )?;
        self.shown_ids.push(question.id);
        Ok(question)
    }

    /// Record an answer and return the points it earned.
    pub fn submit(
        &mut self,
        question: &Question,
        correct: bool,
        time_remaining_percentage: f64,
    ) -> i64 {
        let points = if correct {
            calculate_score(
                BASE_POINTS,
                question.experience_level,
                time_remaining_percentage,
                self.settings.time_limit,
            )
        } else {
            0
        };
        self.outcomes.push(AnswerOutcome {
            question_id: question.id,
            correct,
            points,
        });
        points
    }

    /// Challenge modes end after their question count; continuous play never
    /// ends on its own.
    pub fn is_finished(&self) -> bool {
        self.settings
            .mode
            .question_count()
            .is_some_and(|count| self.outcomes.len() >= count)
    }

    pub fn total_score(&self) -> i64 {
        self.outcomes.iter().map(|o| o.points).sum()
    }

    pub fn answered(&self) -> usize {
        self.outcomes.len()
    }

    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    pub fn outcomes(&self) -> &[AnswerOutcome] {
        &self.outcomes
    }

    /// Build the ledger entry for this session, stamped now.
    pub fn into_score_entry(self, name: impl Into<String>) -> ScoreEntry {
        ScoreEntry::new(name, self.total_score(), self.settings.mode)
    }
}

/// Percentage of the time limit left after `elapsed`, clamped to `[0, 100]`.
///
/// Without a time limit there is no speed bonus, so this returns 0.
pub fn time_remaining_percentage(elapsed: Duration, time_limit: Option<TimeLimit>) -> f64 {
    let Some(limit) = time_limit else {
        return 0.0;
    };
    let limit_secs = f64::from(limit.seconds());
    let remaining = (limit_secs - elapsed.as_secs_f64()) / limit_secs * 100.0;
    remaining.clamp(0.0, 100.0)
}

/// Returns `true` once `elapsed` exceeds the limit.
pub fn is_timed_out(elapsed: Duration, time_limit: Option<TimeLimit>) -> bool {
    time_limit.is_some_and(|limit| elapsed > Duration::from_secs(u64::from(limit.seconds())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::{ExperienceLevel, GameMode, QuestionType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiz(count: u32) -> QuizService {
        let questions = (1..=count)
            .map(|id| Question {
                id,
                experience_level: ExperienceLevel::new(((id - 1) % 5 + 1) as u8).unwrap(),
                question: format!("q{id}"),
                correct_answers: vec![format!("a{id}")],
                question_type: QuestionType::ExactMatch,
                tags: vec!["general".into()],
            })
            .collect();
        QuizService::new(Catalog::new(questions).unwrap())
    }

    fn settings(mode: GameMode) -> GameSettings {
        GameSettings {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn never_repeats_until_exhausted() {
        let quiz = quiz(4);
        let mut session = GameSession::new(settings(GameMode::Continuous));
        let mut rng = StdRng::seed_from_u64(3);

        let mut ids: Vec<u32> = (0..4)
            .map(|_| session.next_question(&quiz, &mut rng).unwrap().id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let err = session.next_question(&quiz, &mut rng).unwrap_err();
        assert!(err.is_pool_exhausted());
    }

    #[test]
    fn challenge_finishes_after_count() {
        let quiz = quiz(10);
        let mut session = GameSession::new(settings(GameMode::Challenge5));
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..5 {
            assert!(!session.is_finished());
            let q = session.next_question(&quiz, &mut rng).unwrap().clone();
            session.submit(&q, true, 0.0);
        }
        assert!(session.is_finished());
        assert_eq!(session.answered(), 5);
    }

    #[test]
    fn continuous_never_finishes() {
        let quiz = quiz(3);
        let mut session = GameSession::new(settings(GameMode::Continuous));
        let q = quiz.catalog().get(1).unwrap().clone();
        for _ in 0..20 {
            session.submit(&q, false, 0.0);
        }
        assert!(!session.is_finished());
    }

    #[test]
    fn scores_correct_answers_only() {
        let quiz = quiz(5);
        let mut session = GameSession::new(GameSettings {
            mode: GameMode::Challenge5,
            time_limit: Some(TimeLimit::Ten),
            ..Default::default()
        });

        let hard = quiz.catalog().get(5).unwrap().clone();
        let easy = quiz.catalog().get(1).unwrap().clone();
        assert_eq!(session.submit(&hard, true, 100.0), 512);
        assert_eq!(session.submit(&easy, false, 100.0), 0);
        assert_eq!(session.submit(&easy, true, 0.0), 160);

        assert_eq!(session.total_score(), 672);
        assert_eq!(session.correct_count(), 2);

        let entry = session.into_score_entry("ada");
        assert_eq!(entry.score, 672);
        assert_eq!(entry.mode, GameMode::Challenge5);
    }

    #[test]
    fn respects_session_filters() {
        let quiz = quiz(10);
        let mut session = GameSession::new(GameSettings {
            mode: GameMode::Continuous,
            experience_level: ExperienceLevel::new(1),
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(5);

        // Levels cycle 1..=5, so only ids 1 and 6 are level 1.
        let mut ids = vec![
            session.next_question(&quiz, &mut rng).unwrap().id,
            session.next_question(&quiz, &mut rng).unwrap().id,
        ];
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 6]);
        assert!(session.next_question(&quiz, &mut rng).is_err());
    }

    #[test]
    fn remaining_percentage() {
        let limit = Some(TimeLimit::Ten);
        assert_eq!(time_remaining_percentage(Duration::ZERO, limit), 100.0);
        assert_eq!(time_remaining_percentage(Duration::from_secs(5), limit), 50.0);
        assert_eq!(time_remaining_percentage(Duration::from_secs(30), limit), 0.0);
        assert_eq!(time_remaining_percentage(Duration::from_secs(1), None), 0.0);
    }

    #[test]
    fn timeout_detection() {
        let limit = Some(TimeLimit::Fifteen);
        assert!(!is_timed_out(Duration::from_secs(15), limit));
        assert!(is_timed_out(Duration::from_millis(15_001), limit));
        assert!(!is_timed_out(Duration::from_secs(3600), None));
    }
}
