//! Quiz CRUD endpoints
//!
//! Control flow is the same for every handler: parse id and body, validate,
//! issue one store call, wrap the result in the envelope.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use saturno_common::Quiz;
use tracing::{debug, info};

use super::envelope::ApiResponse;
use super::payload::{parse_quiz_id, CreateQuizRequest, UpdateQuizRequest};
use crate::{ApiError, ApiResult, AppState};

const QUIZ_NOT_FOUND: &str = "Quiz not found";

/// GET /api/quizzes
///
/// All quizzes, newest first.
pub async fn list_quizzes(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Quiz>>>> {
    let quizzes = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::store("Error retrieving quizzes", e, state.expose_error_details()))?;

    debug!("Listing {} quizzes", quizzes.len());
    Ok(Json(ApiResponse::ok(quizzes)))
}

/// GET /api/quizzes/categories
///
/// Distinct categories in alphabetical order.
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    let mut categories = state.store.categories().await.map_err(|e| {
        ApiError::store("Error retrieving categories", e, state.expose_error_details())
    })?;
    categories.sort();
    categories.dedup();

    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/quizzes/:id
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    let id = parse_quiz_id(&id)?;

    let quiz = state
        .store
        .get(id)
        .await
        .map_err(|e| ApiError::store("Error retrieving quiz", e, state.expose_error_details()))?
        .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.to_string()))?;

    Ok(Json(ApiResponse::ok(quiz)))
}

/// POST /api/quizzes
///
/// **Errors:**
/// - 400 Bad Request: malformed JSON, or any field missing or blank
/// - 500 Internal Server Error: store failure
pub async fn create_quiz(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Quiz>>)> {
    let Json(request) = payload?;
    let new_quiz = request.validate()?;

    let quiz = state
        .store
        .create(new_quiz)
        .await
        .map_err(|e| ApiError::store("Error creating quiz", e, state.expose_error_details()))?;

    info!("Created quiz {} ({})", quiz.id, quiz.category);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(quiz))))
}

/// PUT /api/quizzes/:id
///
/// Partial update; only fields present in the body change.
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateQuizRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Quiz>>> {
    let id = parse_quiz_id(&id)?;
    let Json(request) = payload?;
    let update = request.validate()?;

    let quiz = state
        .store
        .update(id, update)
        .await
        .map_err(|e| ApiError::store("Error updating quiz", e, state.expose_error_details()))?
        .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.to_string()))?;

    info!("Updated quiz {}", quiz.id);
    Ok(Json(ApiResponse::ok(quiz)))
}

/// DELETE /api/quizzes/:id
///
/// 204 with an empty body on success.
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_quiz_id(&id)?;

    let removed = state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::store("Error deleting quiz", e, state.expose_error_details()))?
        .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.to_string()))?;

    info!("Deleted quiz {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Build quiz routes
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/quizzes",
            get(list_quizzes)
                .post(create_quiz)
                .fallback(super::method_not_allowed),
        )
        .route(
            "/api/quizzes/categories",
            get(list_categories).fallback(super::method_not_allowed),
        )
        .route(
            "/api/quizzes/:id",
            get(get_quiz)
                .put(update_quiz)
                .delete(delete_quiz)
                .fallback(super::method_not_allowed),
        )
}
