//! Core data model types for quiztime.
//!
//! These are the types shared by the selector, the ledger, the graders and
//! the CLI: catalog questions, session settings and persisted score entries.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single catalog question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the catalog.
    pub id: u32,
    /// Difficulty rating, 1 (lowest) to 5 (highest).
    pub experience_level: ExperienceLevel,
    /// The prompt shown to the player.
    pub question: String,
    /// Accepted answers, compared case-insensitively.
    pub correct_answers: Vec<String>,
    /// How the question is graded.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Topic tags used for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    /// Returns `true` if the question carries at least one of `tags`.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// How a question's answer is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Case-insensitive exact match against the accepted answers.
    #[serde(rename = "regex")]
    ExactMatch,
    /// Judged by the remote grader. Never offered by random selection.
    #[serde(rename = "ai-agent")]
    AiAgent,
    /// Multiple choice; the chosen option is matched like an exact answer.
    #[serde(rename = "multiple")]
    MultipleChoice,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::ExactMatch => write!(f, "regex"),
            QuestionType::AiAgent => write!(f, "ai-agent"),
            QuestionType::MultipleChoice => write!(f, "multiple"),
        }
    }
}

/// Ordinal difficulty rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ExperienceLevel(u8);

impl ExperienceLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `level` is outside `1..=5`.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&level)
            .then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ExperienceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("experience level must be 1-5, got {value}"))
    }
}

impl From<ExperienceLevel> for u8 {
    fn from(level: ExperienceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid experience level: {s}"))?;
        Self::try_from(value)
    }
}

/// Per-question time limit in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeLimit {
    Ten,
    Fifteen,
    Twenty,
}

impl TimeLimit {
    pub fn seconds(self) -> u32 {
        match self {
            TimeLimit::Ten => 10,
            TimeLimit::Fifteen => 15,
            TimeLimit::Twenty => 20,
        }
    }
}

impl TryFrom<u32> for TimeLimit {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(TimeLimit::Ten),
            15 => Ok(TimeLimit::Fifteen),
            20 => Ok(TimeLimit::Twenty),
            other => Err(format!("time limit must be 10, 15 or 20, got {other}")),
        }
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> Self {
        limit.seconds()
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

impl FromStr for TimeLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .trim_end_matches('s')
            .parse()
            .map_err(|_| format!("invalid time limit: {s}"))?;
        Self::try_from(value)
    }
}

/// Shape of a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "continuous")]
    Continuous,
    #[serde(rename = "challenge-5")]
    Challenge5,
    #[serde(rename = "challenge-10")]
    Challenge10,
    #[serde(rename = "challenge-15")]
    Challenge15,
}

impl GameMode {
    /// Number of questions in a challenge, `None` for continuous play.
    pub fn question_count(self) -> Option<usize> {
        match self {
            GameMode::Continuous => None,
            GameMode::Challenge5 => Some(5),
            GameMode::Challenge10 => Some(10),
            GameMode::Challenge15 => Some(15),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Continuous => write!(f, "continuous"),
            GameMode::Challenge5 => write!(f, "challenge-5"),
            GameMode::Challenge10 => write!(f, "challenge-10"),
            GameMode::Challenge15 => write!(f, "challenge-15"),
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continuous" => Ok(GameMode::Continuous),
            "challenge-5" | "5" => Ok(GameMode::Challenge5),
            "challenge-10" | "10" => Ok(GameMode::Challenge10),
            "challenge-15" | "15" => Ok(GameMode::Challenge15),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Configuration of a single play session. Fixed for the session's duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub mode: GameMode,
    #[serde(default)]
    pub time_limit: Option<TimeLimit>,
    /// Only questions at or below this level are offered.
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    /// Only questions sharing at least one of these tags are offered.
    /// Empty means no tag filter.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Continuous,
            time_limit: None,
            experience_level: None,
            tags: Vec::new(),
        }
    }
}

/// A persisted high-score record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
    pub mode: GameMode,
    /// ISO-8601 timestamp, e.g. `2026-10-19T08:15:00.000Z`.
    pub date: String,
}

impl ScoreEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(name: impl Into<String>, score: i64, mode: GameMode) -> Self {
        Self {
            name: name.into(),
            score,
            mode,
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
