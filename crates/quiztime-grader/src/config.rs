//! quiztime configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quiztime_core::model::GameMode;

use crate::gemini::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Environment variable that overrides the configured Gemini API key.
pub const API_KEY_ENV: &str = "QUIZTIME_GEMINI_KEY";

/// Configuration for the Gemini grader.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level quiztime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuiztimeConfig {
    /// Remote grader settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Question catalog to use instead of the built-in one.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Directory holding the persisted store (scores and API key).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Game mode used when `play` is run without `--mode`.
    #[serde(default = "default_mode")]
    pub default_mode: GameMode,
    /// Grade answers with the remote grader by default.
    #[serde(default)]
    pub ai_grading: bool,
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("quiztime"))
        .unwrap_or_else(|_| PathBuf::from(".quiztime"))
}
fn default_mode() -> GameMode {
    GameMode::Continuous
}

impl Default for QuiztimeConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            catalog: None,
            data_dir: default_data_dir(),
            default_mode: default_mode(),
            ai_grading: false,
        }
    }
}

impl QuiztimeConfig {
    /// Path of the JSON file backing the key-value store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Single pass: text substituted from a variable is not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quiztime.toml` in the current directory
/// 2. `~/.config/quiztime/config.toml`
///
/// Environment variable override: `QUIZTIME_GEMINI_KEY`.
pub fn load_config() -> Result<QuiztimeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuiztimeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quiztime.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuiztimeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuiztimeConfig::default(),
    };

    config.gemini.api_key = config.gemini.api_key.as_deref().map(resolve_env_vars);

    // The env override is taken verbatim.
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.gemini.api_key = Some(key);
    }
    config.gemini.api_key = config.gemini.api_key.filter(|k| !k.is_empty());
    config.gemini.base_url = config.gemini.base_url.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quiztime"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZTIME_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZTIME_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZTIME_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_QUIZTIME_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_reexpand() {
        std::env::set_var("_QUIZTIME_TEST_SELF", "${_QUIZTIME_TEST_SELF}");
        assert_eq!(
            resolve_env_vars("a-${_QUIZTIME_TEST_SELF}-b"),
            "a-${_QUIZTIME_TEST_SELF}-b"
        );
        std::env::remove_var("_QUIZTIME_TEST_SELF");
        assert_eq!(resolve_env_vars("${_QUIZTIME_TEST_UNSET_VAR}x"), "x");
    }

    #[test]
    fn env_key_override_is_not_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiztime.toml");
        std::fs::write(&path, "[gemini]\napi_key = \"from-file\"\n").unwrap();

        std::env::set_var(API_KEY_ENV, "k${_QUIZTIME_TEST_UNSET_VAR}");
        let config = load_config_from(Some(&path));
        std::env::remove_var(API_KEY_ENV);

        assert_eq!(
            config.unwrap().gemini.api_key.as_deref(),
            Some("k${_QUIZTIME_TEST_UNSET_VAR}")
        );
    }

    #[test]
    fn default_config() {
        let config = QuiztimeConfig::default();
        assert_eq!(config.default_mode, GameMode::Continuous);
        assert_eq!(config.gemini.model, "gemini-2.5-flash-lite");
        assert_eq!(config.gemini.timeout_secs, 30);
        assert!(!config.ai_grading);
        assert!(config.store_path().ends_with("store.json"));
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
data_dir = "/tmp/quiztime-data"
catalog = "questions.json"
default_mode = "challenge-10"
ai_grading = true

[gemini]
api_key = "sk-test"
model = "gemini-2.5-flash"
timeout_secs = 5
"#;
        let config: QuiztimeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_mode, GameMode::Challenge10);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/quiztime-data"));
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.api_key.as_deref(), Some("sk-test"));
        assert!(config.ai_grading);
    }

    #[test]
    fn debug_masks_api_key() {
        let config = GeminiConfig {
            api_key: Some("super-secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_resolves_env_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiztime.toml");
        std::fs::write(
            &path,
            "[gemini]\nbase_url = \"http://${_QUIZTIME_TEST_HOST}:9000\"\n",
        )
        .unwrap();

        std::env::set_var("_QUIZTIME_TEST_HOST", "localhost");
        let config = load_config_from(Some(&path)).unwrap();
        std::env::remove_var("_QUIZTIME_TEST_HOST");

        assert_eq!(
            config.gemini.base_url.as_deref(),
            Some("http://localhost:9000")
        );
    }
}
