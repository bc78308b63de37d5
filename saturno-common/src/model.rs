//! Quiz domain model
//!
//! These are the types handlers and stores exchange. Field names are
//! camelCase on the wire; the store identifier is serialized as `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One possible answer to a quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub is_correct: bool,
    pub text: String,
}

impl QuizAnswer {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            is_correct,
            text: text.into(),
        }
    }
}

/// A stored quiz record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Store-assigned identifier (24 hex characters)
    #[serde(rename = "_id")]
    pub id: String,
    pub answers: Vec<QuizAnswer>,
    pub category: String,
    pub game_name: String,
    pub lore: String,
    pub question: String,
    pub saga: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-supplied fields of a quiz about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz {
    pub answers: Vec<QuizAnswer>,
    pub category: String,
    pub game_name: String,
    pub lore: String,
    pub question: String,
    pub saga: String,
    pub source: String,
}

impl NewQuiz {
    /// Attach an identifier and timestamps, producing the stored record
    pub fn into_quiz(self, id: String, now: DateTime<Utc>) -> Quiz {
        Quiz {
            id,
            answers: self.answers,
            category: self.category,
            game_name: self.game_name,
            lore: self.lore,
            question: self.question,
            saga: self.saga,
            source: self.source,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a quiz; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<QuizAnswer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saga: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl QuizUpdate {
    /// True when no field would be changed
    pub fn is_empty(&self) -> bool {
        self.answers.is_none()
            && self.category.is_none()
            && self.game_name.is_none()
            && self.lore.is_none()
            && self.question.is_none()
            && self.saga.is_none()
            && self.source.is_none()
    }

    /// Apply present fields to `quiz` and refresh its `updated_at`
    pub fn apply_to(self, quiz: &mut Quiz, now: DateTime<Utc>) {
        if let Some(answers) = self.answers {
            quiz.answers = answers;
        }
        if let Some(category) = self.category {
            quiz.category = category;
        }
        if let Some(game_name) = self.game_name {
            quiz.game_name = game_name;
        }
        if let Some(lore) = self.lore {
            quiz.lore = lore;
        }
        if let Some(question) = self.question {
            quiz.question = question;
        }
        if let Some(saga) = self.saga {
            quiz.saga = saga;
        }
        if let Some(source) = self.source {
            quiz.source = source;
        }
        quiz.updated_at = now;
    }
}
