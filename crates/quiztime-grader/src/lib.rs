//! quiztime-grader — Remote answer grading.
//!
//! Implements the `AnswerGrader` trait on top of the Gemini API, keeps the
//! grading credential cached and persisted, and loads quiztime configuration.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{load_config, load_config_from, GeminiConfig, QuiztimeConfig};
pub use error::GraderError;
pub use gemini::GeminiGrader;
