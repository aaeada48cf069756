//! Gemini API grader implementation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quiztime_core::store::KeyValueStore;
use quiztime_core::traits::{AnswerGrader, GradeRequest};

use crate::config::GeminiConfig;
use crate::error::GraderError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Store key holding the persisted API key.
pub const API_KEY_STORAGE_KEY: &str = "gemini_api_key";

// Near-deterministic, one-word verdicts.
const TEMPERATURE: f64 = 0.1;
const MAX_OUTPUT_TOKENS: u32 = 10;

/// Grades free-text answers with a Gemini model.
///
/// The API key is cached in memory once known. When it is not set, it is
/// loaded lazily from the key-value store on first use.
pub struct GeminiGrader {
    store: Arc<dyn KeyValueStore>,
    api_key: Mutex<Option<String>>,
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiGrader {
    pub fn new(store: Arc<dyn KeyValueStore>, base_url: Option<String>) -> Result<Self> {
        Self::build(
            store,
            base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            DEFAULT_MODEL.to_string(),
            DEFAULT_TIMEOUT_SECS,
        )
    }

    /// Build a grader from configuration. A key given in the configuration is
    /// cached for this process but not written to the store.
    pub fn from_config(config: &GeminiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let grader = Self::build(
            store,
            config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            config.model.clone(),
            config.timeout_secs,
        )?;
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            *grader.cached_key()? = Some(key.to_string());
        }
        Ok(grader)
    }

    fn build(
        store: Arc<dyn KeyValueStore>,
        base_url: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            store,
            api_key: Mutex::new(None),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout_secs,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Cache the key and persist it, replacing any previous key.
    pub fn set_api_key(&self, key: &str) -> Result<()> {
        *self.cached_key()? = Some(key.to_string());
        self.store.set_item(API_KEY_STORAGE_KEY, key)?;
        tracing::info!("Gemini API key updated");
        Ok(())
    }

    /// The cached key, else the persisted one (which is then cached).
    ///
    /// An empty key counts as no key.
    pub fn api_key(&self) -> Result<Option<String>> {
        let mut cached = self.cached_key()?;
        if cached.as_deref().map_or(true, str::is_empty) {
            *cached = None;
            if let Some(stored) = self.store.get_item(API_KEY_STORAGE_KEY)? {
                if !stored.is_empty() {
                    tracing::debug!("loaded Gemini API key from store");
                    *cached = Some(stored);
                }
            }
        }
        Ok(cached.clone())
    }

    pub fn has_api_key(&self) -> Result<bool> {
        Ok(self.api_key()?.is_some())
    }

    /// Ask the model whether `user_answer` is a correct answer to `question`.
    ///
    /// Fails with [`GraderError::CredentialMissing`] before any request when
    /// no key is configured. Not retried.
    pub async fn check_answer(
        &self,
        question: &str,
        user_answer: &str,
        correct_answers: &[String],
    ) -> Result<bool> {
        let api_key = self.api_key()?.ok_or(GraderError::CredentialMissing)?;

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(build_prompt(question, user_answer, correct_answers)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let url = reqwest::Url::parse_with_params(&endpoint, &[("key", api_key.as_str())])
            .with_context(|| format!("invalid Gemini endpoint: {endpoint}"))?;

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    GraderError::Timeout(self.timeout_secs)
                } else {
                    GraderError::NetworkError(e.without_url().to_string())
                };
                tracing::error!(error = %err, "Gemini request failed");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::error!(status = status.as_u16(), %message, "Gemini API error");
            return Err(GraderError::ApiError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let api_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Gemini response");
            GraderError::MalformedResponse(format!("failed to parse response: {e}"))
        })?;

        let verdict = api_response
            .first_text()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("Gemini response has no judgment text");
                GraderError::MalformedResponse("response has no judgment text".into())
            })?;

        tracing::debug!(%verdict, "Gemini verdict");
        Ok(verdict == "yes")
    }

    fn cached_key(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.api_key
            .lock()
            .map_err(|_| anyhow::anyhow!("API key cache lock poisoned"))
    }
}

impl std::fmt::Debug for GeminiGrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGrader")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"***")
            .finish()
    }
}

fn build_prompt(question: &str, user_answer: &str, correct_answers: &[String]) -> String {
    format!(
        "You are grading a programming quiz answer.\n\
         \n\
         Question: {question}\n\
         Student's Answer: {user_answer}\n\
         Expected Answer(s): {expected}\n\
         \n\
         Is the student's answer correct? Consider:\n\
         - Technical accuracy\n\
         - Conceptual understanding\n\
         - Acceptable variations in wording\n\
         \n\
         Respond with ONLY \"yes\" or \"no\" (lowercase, no punctuation).",
        expected = correct_answers.join(" OR "),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl AnswerGrader for GeminiGrader {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn grade(&self, request: &GradeRequest) -> Result<bool> {
        self.check_answer(
            &request.question,
            &request.user_answer,
            &request.correct_answers,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiztime_core::store::MemoryStore;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-lite:generateContent";

    fn verdict_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        })
    }

    fn grader_with_key(server: &MockServer) -> GeminiGrader {
        let grader = GeminiGrader::new(Arc::new(MemoryStore::new()), Some(server.uri())).unwrap();
        grader.set_api_key("test-key").unwrap();
        grader
    }

    fn answers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn yes_verdict_is_correct() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"temperature": 0.1, "maxOutputTokens": 10}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body(" YES\n")))
            .expect(1)
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let correct = grader
            .check_answer("What is 2 + 2?", "four", &answers(&["4"]))
            .await
            .unwrap();
        assert!(correct);
    }

    #[tokio::test]
    async fn anything_but_yes_is_incorrect() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("No.")))
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let correct = grader
            .check_answer("What is 2 + 2?", "five", &answers(&["4"]))
            .await
            .unwrap();
        assert!(!correct);
    }

    #[tokio::test]
    async fn prompt_lists_accepted_answers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("yes")))
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        grader
            .check_answer("Name a VCS", "git", &answers(&["git", "mercurial"]))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Question: Name a VCS"));
        assert!(prompt.contains("Student's Answer: git"));
        assert!(prompt.contains("git OR mercurial"));
        assert!(prompt.contains(
            "Consider:\n- Technical accuracy\n- Conceptual understanding\n- Acceptable variations in wording\n"
        ));
    }

    #[tokio::test]
    async fn empty_key_counts_as_missing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("yes")))
            .expect(0)
            .mount(&server)
            .await;

        let grader = GeminiGrader::new(Arc::new(MemoryStore::new()), Some(server.uri())).unwrap();
        grader.set_api_key("").unwrap();
        assert!(!grader.has_api_key().unwrap());

        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::CredentialMissing)
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("yes")))
            .expect(0)
            .mount(&server)
            .await;

        let grader = GeminiGrader::new(Arc::new(MemoryStore::new()), Some(server.uri())).unwrap();
        assert!(!grader.has_api_key().unwrap());

        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::CredentialMissing)
        ));
    }

    #[tokio::test]
    async fn api_error_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        let grader_err = err.downcast_ref::<GraderError>().unwrap();
        assert_eq!(grader_err.status(), Some(403));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn server_error_with_plain_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn response_without_text_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn blank_verdict_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("   ")))
            .mount(&server)
            .await;

        let grader = grader_with_key(&server);
        let err = grader
            .check_answer("q", "a", &answers(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraderError>(),
            Some(GraderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn grades_through_trait() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body("yes")))
            .mount(&server)
            .await;

        let grader: Box<dyn AnswerGrader> = Box::new(grader_with_key(&server));
        let request = GradeRequest {
            question: "q".into(),
            user_answer: "a".into(),
            correct_answers: answers(&["a"]),
        };
        assert_eq!(grader.name(), "gemini");
        assert!(grader.grade(&request).await.unwrap());
    }

    #[test]
    fn key_is_loaded_lazily_and_cached() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(API_KEY_STORAGE_KEY, "stored-key").unwrap();

        let grader = GeminiGrader::new(store.clone(), None).unwrap();
        assert_eq!(grader.api_key().unwrap().as_deref(), Some("stored-key"));

        store.remove_item(API_KEY_STORAGE_KEY).unwrap();
        assert!(grader.has_api_key().unwrap());
    }

    #[test]
    fn set_key_persists_and_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let grader = GeminiGrader::new(store.clone(), None).unwrap();

        grader.set_api_key("first").unwrap();
        grader.set_api_key("second").unwrap();

        assert_eq!(grader.api_key().unwrap().as_deref(), Some("second"));
        assert_eq!(
            store.get_item(API_KEY_STORAGE_KEY).unwrap().as_deref(),
            Some("second")
        );

        let fresh = GeminiGrader::new(store, None).unwrap();
        assert_eq!(fresh.api_key().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn configured_key_is_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let config = GeminiConfig {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        let grader = GeminiGrader::from_config(&config, store.clone()).unwrap();

        assert_eq!(grader.api_key().unwrap().as_deref(), Some("from-config"));
        assert_eq!(store.get_item(API_KEY_STORAGE_KEY).unwrap(), None);
        assert!(!format!("{grader:?}").contains("from-config"));
    }
}
