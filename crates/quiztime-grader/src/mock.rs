//! Mock grader for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quiztime_core::traits::{AnswerGrader, GradeRequest};

use crate::error::GraderError;

/// A mock grader for exercising sessions without real API calls.
///
/// Returns configurable verdicts based on the player's answer.
pub struct MockGrader {
    /// Map of lowercased answer → verdict.
    verdicts: HashMap<String, bool>,
    /// Verdict if no answer matches.
    default_verdict: bool,
    /// Fail every call with `CredentialMissing` instead of judging.
    unconfigured: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GradeRequest>>,
}

impl MockGrader {
    /// Create a mock with the given answer→verdict mappings.
    pub fn new(verdicts: HashMap<String, bool>) -> Self {
        Self {
            verdicts: verdicts
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            default_verdict: false,
            unconfigured: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same verdict.
    pub fn with_fixed_verdict(verdict: bool) -> Self {
        Self {
            default_verdict: verdict,
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock that behaves like a grader with no API key.
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::new(HashMap::new())
        }
    }

    /// Get the number of calls made to this grader.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this grader.
    pub fn last_request(&self) -> Option<GradeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGrader for MockGrader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<bool> {
        if self.unconfigured {
            return Err(GraderError::CredentialMissing.into());
        }
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let key = request.user_answer.trim().to_lowercase();
        Ok(self
            .verdicts
            .get(&key)
            .copied()
            .unwrap_or(self.default_verdict))
    }
}
