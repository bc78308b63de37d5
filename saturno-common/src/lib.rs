//! # Saturno Common Library
//!
//! Shared code for the Saturno quiz service:
//! - Quiz domain model (wire and store independent)
//! - Common error type
//! - Configuration loading and resolution

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{NewQuiz, Quiz, QuizAnswer, QuizUpdate};
