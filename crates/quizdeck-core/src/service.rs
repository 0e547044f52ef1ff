//! Request-level quiz operations.
//!
//! Coordinates validation, access checks, grading and the backing store for
//! everything a caller can do with quizzes and submissions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::access::{Caller, Capability};
use crate::error::{QuizError, QuizResult};
use crate::grading::GradeResult;
use crate::model::{
    Answers, NewSubmission, QuestionId, Quiz, QuizId, QuizView, Submission, SubmissionId,
};
use crate::report::{QuizReport, QuizSummary};
use crate::scoring::score;
use crate::statistics::{compute_quiz_stats, QuizStats};
use crate::traits::{GradedSubmission, Store};
use crate::validation::{validate_quiz_draft, validate_quiz_patch, QuizDraft, QuizPatch};

/// Body of a submit call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub answers: Option<Answers>,
    /// Optional participant name for anonymous takers.
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of a submit call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub message: String,
    pub participant_name: Option<String>,
    pub score: u64,
    pub total_points: u64,
    pub percentage: f64,
    pub results: BTreeMap<QuestionId, GradeResult>,
    pub submission_id: SubmissionId,
}

/// Every submission to one quiz, for its administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmissions {
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub submissions: Vec<Submission>,
    pub stats: QuizStats,
}

/// Quiz operations over a backing store.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn Store>,
}

impl QuizService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Quizzes visible to `caller`, newest first, never with answers.
    pub async fn list_quizzes(&self, caller: &Caller) -> QuizResult<Vec<QuizView>> {
        let include_inactive = caller.can(Capability::ViewInactiveQuizzes);
        let quizzes = self
            .store
            .list_quizzes(include_inactive)
            .await
            .map_err(QuizError::from_store)?;
        Ok(quizzes.iter().map(|q| q.view(false)).collect())
    }

    /// One quiz; answers are included for callers allowed to see them.
    pub async fn get_quiz(&self, caller: &Caller, id: QuizId) -> QuizResult<QuizView> {
        let quiz = self
            .store
            .get_quiz(id)
            .await
            .map_err(QuizError::from_store)?
            .filter(|q| q.is_active || caller.can(Capability::ViewInactiveQuizzes))
            .ok_or_else(|| QuizError::NotFound("Quiz not found or not available".into()))?;
        Ok(quiz.view(caller.can(Capability::ViewCorrectAnswers)))
    }

    pub async fn create_quiz(&self, caller: &Caller, draft: &QuizDraft) -> QuizResult<QuizView> {
        caller.require(Capability::ManageQuizzes)?;
        let identity = caller.require_identity()?;
        let new_quiz = validate_quiz_draft(draft)?;

        self.store
            .get_user(identity.user_id)
            .await
            .map_err(QuizError::from_store)?
            .ok_or_else(|| QuizError::NotFound("User not found".into()))?;

        let quiz = self
            .store
            .create_quiz(identity.user_id, &new_quiz)
            .await
            .map_err(QuizError::from_store)?;
        tracing::info!(
            quiz_id = quiz.id,
            questions = quiz.questions.len(),
            "quiz created"
        );
        Ok(quiz.view(true))
    }

    pub async fn update_quiz(
        &self,
        caller: &Caller,
        id: QuizId,
        patch: &QuizPatch,
    ) -> QuizResult<QuizView> {
        caller.require(Capability::ManageQuizzes)?;
        let update = validate_quiz_patch(patch)?;
        let quiz = self
            .store
            .update_quiz(id, &update)
            .await
            .map_err(QuizError::from_store)?
            .ok_or_else(|| QuizError::NotFound("Quiz not found".into()))?;
        tracing::info!(quiz_id = id, "quiz updated");
        Ok(quiz.view(true))
    }

    pub async fn delete_quiz(&self, caller: &Caller, id: QuizId) -> QuizResult<()> {
        caller.require(Capability::ManageQuizzes)?;
        let existed = self
            .store
            .delete_quiz(id)
            .await
            .map_err(QuizError::from_store)?;
        if !existed {
            return Err(QuizError::NotFound("Quiz not found".into()));
        }
        tracing::info!(quiz_id = id, "quiz deleted");
        Ok(())
    }

    /// Grade and record a set of answers.
    ///
    /// Fails with `NotFound` when the quiz is missing or inactive and with
    /// `Validation` when no answers are supplied.
    pub async fn submit(
        &self,
        caller: &Caller,
        quiz_id: QuizId,
        request: &SubmitRequest,
    ) -> QuizResult<SubmitOutcome> {
        caller.require(Capability::SubmitAnswers)?;
        let participant_name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let answers = request.answers.clone().unwrap_or_default();
        let user_id = caller.user_id();

        let grader = |quiz: Option<&Quiz>| -> QuizResult<GradedSubmission> {
            let quiz = quiz
                .filter(|q| q.is_active)
                .ok_or_else(|| QuizError::NotFound("Quiz not found or not available".into()))?;
            if answers.is_empty() {
                return Err(QuizError::Validation("No answers provided".into()));
            }
            let card = score(quiz, &answers);
            Ok(GradedSubmission {
                record: NewSubmission {
                    user_id,
                    quiz_id,
                    participant_name: participant_name.clone(),
                    answers: answers.clone(),
                    score: card.earned,
                    total_points: card.total,
                },
                card,
            })
        };

        let recorded = match self.store.record_graded(quiz_id, &grader).await {
            Ok(recorded) => recorded,
            Err(e) => {
                let err = QuizError::from_store(e);
                tracing::debug!(quiz_id, "submission rejected: {err}");
                return Err(err);
            }
        };

        tracing::info!(
            quiz_id,
            submission_id = recorded.submission.id,
            score = recorded.card.earned,
            total = recorded.card.total,
            "submission recorded"
        );

        Ok(SubmitOutcome {
            message: "Quiz submitted successfully".into(),
            participant_name,
            score: recorded.card.earned,
            total_points: recorded.card.total,
            percentage: recorded.card.percentage,
            results: recorded.card.results,
            submission_id: recorded.submission.id,
        })
    }

    /// All submissions to a quiz with summary statistics (admin only).
    pub async fn quiz_submissions(
        &self,
        caller: &Caller,
        quiz_id: QuizId,
    ) -> QuizResult<QuizSubmissions> {
        caller.require(Capability::ViewQuizSubmissions)?;
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await
            .map_err(QuizError::from_store)?
            .ok_or_else(|| QuizError::NotFound("Quiz not found".into()))?;
        let submissions = self
            .store
            .submissions_for_quiz(quiz_id)
            .await
            .map_err(QuizError::from_store)?;
        let stats = compute_quiz_stats(&quiz, &submissions);

        Ok(QuizSubmissions {
            quiz_id,
            quiz_title: quiz.title,
            submissions,
            stats,
        })
    }

    /// The caller's own submissions, newest first.
    pub async fn my_submissions(&self, caller: &Caller) -> QuizResult<Vec<Submission>> {
        let identity = caller.require_identity()?;
        caller.require(Capability::ViewOwnSubmissions)?;
        self.store
            .submissions_for_user(identity.user_id)
            .await
            .map_err(QuizError::from_store)
    }

    /// Build an exportable report for a quiz (admin only).
    pub async fn quiz_report(&self, caller: &Caller, quiz_id: QuizId) -> QuizResult<QuizReport> {
        caller.require(Capability::ViewQuizSubmissions)?;
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await
            .map_err(QuizError::from_store)?
            .ok_or_else(|| QuizError::NotFound("Quiz not found".into()))?;
        let submissions = self
            .store
            .submissions_for_quiz(quiz_id)
            .await
            .map_err(QuizError::from_store)?;
        let stats = compute_quiz_stats(&quiz, &submissions);

        Ok(QuizReport {
            id: uuid::Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            quiz: QuizSummary::from_quiz(&quiz),
            questions: quiz.view(true).questions,
            submissions,
            stats,
        })
    }
}
