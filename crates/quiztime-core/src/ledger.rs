//! High-score ledger persisted in a key-value store.
//!
//! The whole score list lives under one key as a JSON array. Writes are
//! read-modify-write with no concurrency control.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::error::QuizError;
use crate::model::{GameMode, ScoreEntry};
use crate::store::KeyValueStore;

/// Store key holding the serialized score list.
pub const SCORES_KEY: &str = "quiztime_scores";

/// Default number of entries returned by [`ScoreLedger::top_scores`].
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Persists and ranks score entries.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All scores in insertion order, optionally restricted to one mode.
    pub fn scores(&self, mode: Option<GameMode>) -> Result<Vec<ScoreEntry>> {
        let mut scores = self.load()?;
        if let Some(mode) = mode {
            scores.retain(|s| s.mode == mode);
        }
        Ok(scores)
    }

    /// Append an entry to the persisted list.
    pub fn add_score(&self, entry: ScoreEntry) -> Result<()> {
        let mut scores = self.load()?;
        tracing::info!(name = %entry.name, score = entry.score, mode = %entry.mode, "recording score");
        scores.push(entry);
        self.save(&scores)
    }

    /// Highest scores for `mode`, best first. Equal scores keep insertion order.
    pub fn top_scores(&self, mode: GameMode, limit: usize) -> Result<Vec<ScoreEntry>> {
        let mut scores = self.scores(Some(mode))?;
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores.truncate(limit);
        Ok(scores)
    }

    /// Remove every stored score.
    pub fn clear_scores(&self) -> Result<()> {
        tracing::info!("clearing all scores");
        self.store.remove_item(SCORES_KEY)
    }

    fn load(&self) -> Result<Vec<ScoreEntry>> {
        match self.store.get_item(SCORES_KEY)? {
            Some(data) if !data.is_empty() => {
                serde_json::from_str(&data).map_err(|e| QuizError::CorruptScores(e).into())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, scores: &[ScoreEntry]) -> Result<()> {
        let json = serde_json::to_string(scores).context("failed to serialize scores")?;
        self.store.set_item(SCORES_KEY, &json)
    }
}
