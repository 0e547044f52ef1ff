//! `/api/auth` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use quizdeck_core::access::Caller;
use quizdeck_core::accounts::{AuthSession, LoginRequest};
use quizdeck_core::validation::RegistrationDraft;

use crate::error::ApiResult;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let Json(draft) = body?;
    let session = state.accounts.register(&draft).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthSession>> {
    let Json(request) = body?;
    Ok(Json(state.accounts.login(&request).await?))
}

pub async fn me(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    let user = state.accounts.current_user(&caller).await?;
    Ok(Json(json!({ "user": user })))
}
