//! quiztime-core — Question catalog, selection, scoring and score ledger.
//!
//! This crate defines the data model, the grader and storage traits, and the
//! selection and scoring rules the rest of quiztime builds on.

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod model;
pub mod selector;
pub mod session;
pub mod store;
pub mod traits;

pub use error::QuizError;
