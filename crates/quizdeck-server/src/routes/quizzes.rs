//! `/api/quizzes` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use quizdeck_core::access::Caller;
use quizdeck_core::model::QuizId;
use quizdeck_core::validation::{QuizDraft, QuizPatch};

use crate::error::ApiResult;
use crate::AppState;

pub async fn list_quizzes(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    let quizzes = state.quizzes.list_quizzes(&caller).await?;
    Ok(Json(json!({ "quizzes": quizzes })))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<QuizId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let quiz = state.quizzes.get_quiz(&caller, id).await?;
    Ok(Json(json!({ "quiz": quiz })))
}

pub async fn create_quiz(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<QuizDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(draft) = body?;
    let quiz = state.quizzes.create_quiz(&caller, &draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz created successfully",
            "quiz": quiz,
        })),
    ))
}

pub async fn update_quiz(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<QuizId>, PathRejection>,
    body: Result<Json<QuizPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let quiz = state.quizzes.update_quiz(&caller, id, &patch).await?;
    Ok(Json(json!({
        "message": "Quiz updated successfully",
        "quiz": quiz,
    })))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<QuizId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    state.quizzes.delete_quiz(&caller, id).await?;
    Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}
