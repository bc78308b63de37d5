//! Request bodies and their validation
//!
//! Every field is optional at the serde level so that a missing field is
//! reported as a validation failure (400 with a readable message) instead of
//! a deserialization rejection.

use bson::oid::ObjectId;
use saturno_common::{NewQuiz, QuizAnswer, QuizUpdate};
use serde::Deserialize;

use crate::{ApiError, ApiResult};

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const ANSWERS_REQUIRED: &str = "At least one answer is required";
pub const ANSWER_TEXT_REQUIRED: &str = "Answer text is required";
pub const EMPTY_UPDATE: &str = "Update requires at least one field";

/// Body of `POST /api/quizzes`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub answers: Option<Vec<QuizAnswer>>,
    pub category: Option<String>,
    pub game_name: Option<String>,
    pub lore: Option<String>,
    pub question: Option<String>,
    pub saga: Option<String>,
    pub source: Option<String>,
}

impl CreateQuizRequest {
    /// All seven fields must be present and non-blank
    pub fn validate(self) -> ApiResult<NewQuiz> {
        let (
            Some(answers),
            Some(category),
            Some(game_name),
            Some(lore),
            Some(question),
            Some(saga),
            Some(source),
        ) = (
            self.answers,
            non_blank(self.category),
            non_blank(self.game_name),
            non_blank(self.lore),
            non_blank(self.question),
            non_blank(self.saga),
            non_blank(self.source),
        )
        else {
            return Err(ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string()));
        };

        validate_answers(&answers)?;

        Ok(NewQuiz {
            answers,
            category,
            game_name,
            lore,
            question,
            saga,
            source,
        })
    }
}

/// Body of `PUT /api/quizzes/:id`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    pub answers: Option<Vec<QuizAnswer>>,
    pub category: Option<String>,
    pub game_name: Option<String>,
    pub lore: Option<String>,
    pub question: Option<String>,
    pub saga: Option<String>,
    pub source: Option<String>,
}

impl UpdateQuizRequest {
    /// At least one field must be present; present fields must be non-blank
    pub fn validate(self) -> ApiResult<QuizUpdate> {
        if let Some(answers) = &self.answers {
            validate_answers(answers)?;
        }

        let update = QuizUpdate {
            answers: self.answers,
            category: present("category", self.category)?,
            game_name: present("gameName", self.game_name)?,
            lore: present("lore", self.lore)?,
            question: present("question", self.question)?,
            saga: present("saga", self.saga)?,
            source: present("source", self.source)?,
        };

        if update.is_empty() {
            return Err(ApiError::BadRequest(EMPTY_UPDATE.to_string()));
        }
        Ok(update)
    }
}

/// Parse a path id into a store object id
pub fn parse_quiz_id(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid quiz id: {}", raw)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn present(field: &str, value: Option<String>) -> ApiResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ApiError::BadRequest(format!(
            "Field '{}' cannot be empty",
            field
        ))),
        other => Ok(other),
    }
}

fn validate_answers(answers: &[QuizAnswer]) -> ApiResult<()> {
    if answers.is_empty() {
        return Err(ApiError::BadRequest(ANSWERS_REQUIRED.to_string()));
    }
    if answers.iter().any(|a| a.text.trim().is_empty()) {
        return Err(ApiError::BadRequest(ANSWER_TEXT_REQUIRED.to_string()));
    }
    Ok(())
}
