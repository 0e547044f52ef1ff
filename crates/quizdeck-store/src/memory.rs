//! In-memory store for tests and throwaway servers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quizdeck_core::error::QuizError;
use quizdeck_core::model::{
    NewQuestion, NewQuiz, NewUser, Question, Quiz, QuizId, QuizUpdate, Submission, SubmissionId,
    User, UserId,
};
use quizdeck_core::traits::{
    Grader, QuizStore, RecordedSubmission, SubmissionStore, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    quizzes: BTreeMap<QuizId, Quiz>,
    submissions: BTreeMap<SubmissionId, Submission>,
    last_user_id: i64,
    last_quiz_id: i64,
    last_question_id: i64,
    last_submission_id: i64,
}

impl Tables {
    fn build_questions(&mut self, quiz_id: QuizId, questions: &[NewQuestion]) -> Vec<Question> {
        questions
            .iter()
            .map(|q| {
                self.last_question_id += 1;
                Question {
                    id: self.last_question_id,
                    quiz_id,
                    question_text: q.question_text.clone(),
                    question_type: q.question_type,
                    options: q.options.clone(),
                    correct_answer: q.correct_answer.clone(),
                    points: q.points,
                    order: q.order,
                }
            })
            .collect()
    }
}

/// A store that keeps everything in process memory.
///
/// One `RwLock` guards all tables, so `record_graded` reads and writes under
/// a single write guard.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn list_quizzes(&self, include_inactive: bool) -> anyhow::Result<Vec<Quiz>> {
        let tables = self.tables.read().await;
        let mut quizzes: Vec<Quiz> = tables
            .quizzes
            .values()
            .filter(|q| include_inactive || q.is_active)
            .cloned()
            .collect();
        newest_first(&mut quizzes, |q| (q.created_at, q.id));
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: QuizId) -> anyhow::Result<Option<Quiz>> {
        Ok(self.tables.read().await.quizzes.get(&id).cloned())
    }

    async fn create_quiz(&self, created_by: UserId, quiz: &NewQuiz) -> anyhow::Result<Quiz> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&created_by) {
            return Err(QuizError::NotFound("User not found".into()).into());
        }
        tables.last_quiz_id += 1;
        let id = tables.last_quiz_id;
        let questions = tables.build_questions(id, &quiz.questions);
        let stored = Quiz {
            id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            created_by,
            created_at: Utc::now(),
            is_active: quiz.is_active,
            questions,
        };
        tables.quizzes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_quiz(&self, id: QuizId, update: &QuizUpdate) -> anyhow::Result<Option<Quiz>> {
        let mut tables = self.tables.write().await;
        if !tables.quizzes.contains_key(&id) {
            return Ok(None);
        }
        let questions = update
            .questions
            .as_deref()
            .map(|qs| tables.build_questions(id, qs));

        let Some(quiz) = tables.quizzes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &update.title {
            quiz.title = title.clone();
        }
        if let Some(description) = &update.description {
            quiz.description = description.clone();
        }
        if let Some(is_active) = update.is_active {
            quiz.is_active = is_active;
        }
        if let Some(questions) = questions {
            quiz.questions = questions;
        }
        Ok(Some(quiz.clone()))
    }

    async fn delete_quiz(&self, id: QuizId) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let existed = tables.quizzes.remove(&id).is_some();
        if existed {
            tables.submissions.retain(|_, s| s.quiz_id != id);
        }
        Ok(existed)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn record_graded(
        &self,
        quiz_id: QuizId,
        grader: Grader<'_>,
    ) -> anyhow::Result<RecordedSubmission> {
        let mut tables = self.tables.write().await;
        let graded = grader(tables.quizzes.get(&quiz_id))?;

        tables.last_submission_id += 1;
        let record = graded.record;
        let submission = Submission {
            id: tables.last_submission_id,
            user_id: record.user_id.filter(|id| tables.users.contains_key(id)),
            quiz_id: record.quiz_id,
            participant_name: record.participant_name,
            answers: record.answers,
            score: record.score,
            total_points: record.total_points,
            submitted_at: Utc::now(),
        };
        tables.submissions.insert(submission.id, submission.clone());

        Ok(RecordedSubmission {
            submission,
            card: graded.card,
        })
    }

    async fn submissions_for_quiz(&self, quiz_id: QuizId) -> anyhow::Result<Vec<Submission>> {
        let tables = self.tables.read().await;
        let mut found: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|s| s.quiz_id == quiz_id)
            .cloned()
            .collect();
        newest_first(&mut found, |s| (s.submitted_at, s.id));
        Ok(found)
    }

    async fn submissions_for_user(&self, user_id: UserId) -> anyhow::Result<Vec<Submission>> {
        let tables = self.tables.read().await;
        let mut found: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|s| s.user_id == Some(user_id))
            .cloned()
            .collect();
        newest_first(&mut found, |s| (s.submitted_at, s.id));
        Ok(found)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(QuizError::Conflict("Username already exists".into()).into());
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(QuizError::Conflict("Email already exists".into()).into());
        }
        tables.last_user_id += 1;
        let stored = User {
            id: tables.last_user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}
