//! Store trait definitions.
//!
//! These async traits are implemented by the `quizdeck-store` crate. They
//! return `anyhow::Result`; see [`crate::error`] for how domain errors are
//! carried through them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{
    NewQuiz, NewSubmission, NewUser, Quiz, QuizId, QuizUpdate, Submission, User, UserId,
};
use crate::scoring::ScoreCard;

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// Persistence of quizzes and their questions.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// All quizzes, newest first, each with its questions.
    async fn list_quizzes(&self, include_inactive: bool) -> anyhow::Result<Vec<Quiz>>;

    async fn get_quiz(&self, id: QuizId) -> anyhow::Result<Option<Quiz>>;

    async fn create_quiz(&self, created_by: UserId, quiz: &NewQuiz) -> anyhow::Result<Quiz>;

    /// Apply `update`; `None` when the quiz does not exist.
    async fn update_quiz(&self, id: QuizId, update: &QuizUpdate) -> anyhow::Result<Option<Quiz>>;

    /// Delete a quiz with its questions and submissions. Returns whether it existed.
    async fn delete_quiz(&self, id: QuizId) -> anyhow::Result<bool>;
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A graded submission plus the breakdown it was graded with.
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub record: NewSubmission,
    pub card: ScoreCard,
}

/// What `record_graded` hands back after the write committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSubmission {
    pub submission: Submission,
    pub card: ScoreCard,
}

/// Grades the quiz as read inside the recording transaction.
///
/// An `Err` aborts the transaction and is returned to the caller through
/// `anyhow`, recoverable with [`QuizError::from_store`].
pub type Grader<'a> = &'a (dyn Fn(Option<&Quiz>) -> Result<GradedSubmission, QuizError> + Send + Sync);

/// Persistence of graded submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Read the quiz, grade it with `grader`, and write the result, all in
    /// one transaction.
    async fn record_graded(
        &self,
        quiz_id: QuizId,
        grader: Grader<'_>,
    ) -> anyhow::Result<RecordedSubmission>;

    /// Submissions to a quiz, newest first.
    async fn submissions_for_quiz(&self, quiz_id: QuizId) -> anyhow::Result<Vec<Submission>>;

    /// Submissions made by a user, newest first.
    async fn submissions_for_user(&self, user_id: UserId) -> anyhow::Result<Vec<Submission>>;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Persistence of accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User>;

    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Look a user up by username, falling back to email.
    async fn find_by_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        if let Some(user) = self.find_by_username(login).await? {
            return Ok(Some(user));
        }
        self.find_by_email(&login.to_lowercase()).await
    }
}

/// Everything the service layer needs from a backing store.
pub trait Store: QuizStore + SubmissionStore + UserStore {}

impl<T: QuizStore + SubmissionStore + UserStore> Store for T {}
