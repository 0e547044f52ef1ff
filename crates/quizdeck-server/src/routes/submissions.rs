//! `/api/submissions` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use quizdeck_core::access::Caller;
use quizdeck_core::model::QuizId;
use quizdeck_core::service::{QuizSubmissions, SubmitOutcome, SubmitRequest};

use crate::error::ApiResult;
use crate::AppState;

pub async fn submit(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<QuizId>, PathRejection>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitOutcome>> {
    let Path(quiz_id) = path?;
    let Json(request) = body?;
    Ok(Json(state.quizzes.submit(&caller, quiz_id, &request).await?))
}

pub async fn quiz_submissions(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<QuizId>, PathRejection>,
) -> ApiResult<Json<QuizSubmissions>> {
    let Path(quiz_id) = path?;
    Ok(Json(state.quizzes.quiz_submissions(&caller, quiz_id).await?))
}

pub async fn my_submissions(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    let submissions = state.quizzes.my_submissions(&caller).await?;
    Ok(Json(json!({ "submissions": submissions })))
}
