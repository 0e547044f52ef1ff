//! Route table.

pub mod auth;
pub mod health;
pub mod quizzes;
pub mod submissions;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// All API routes, relative to the server root.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/quizzes",
            get(quizzes::list_quizzes).post(quizzes::create_quiz),
        )
        .route(
            "/api/quizzes/:id",
            get(quizzes::get_quiz)
                .put(quizzes::update_quiz)
                .delete(quizzes::delete_quiz),
        )
        .route(
            "/api/submissions/quizzes/:id/submit",
            post(submissions::submit),
        )
        .route(
            "/api/submissions/quizzes/:id/submissions",
            get(submissions::quiz_submissions),
        )
        .route(
            "/api/submissions/my-submissions",
            get(submissions::my_submissions),
        )
}
