//! Core data model types for quizdeck.
//!
//! Quizzes, questions, users and submissions as the rest of the system sees
//! them, plus the raw answer map participants send in.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type QuizId = i64;
pub type QuestionId = i64;
pub type UserId = i64;
pub type SubmissionId = i64;

/// The kind of a question, which decides how answers are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Text,
    /// A stored type this build does not know. Never produced by validation.
    #[serde(other)]
    Other,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Text => "text",
            QuestionType::Other => "other",
        }
    }

    /// Map a stored type string, falling back to [`QuestionType::Other`].
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(QuestionType::Other)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "text" => Ok(QuestionType::Text),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A single gradable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_text: String,
    pub question_type: QuestionType,
    /// Choice list; only populated for multiple choice questions.
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
    /// Display and grading position, ascending.
    pub order: i32,
}

/// A named, ordered collection of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Questions in grading order: ascending `order`, ties broken by id.
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self.questions.iter().collect();
        questions.sort_by_key(|q| (q.order, q.id));
        questions
    }

    /// Sum of all question point values.
    pub fn total_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }

    /// Render this quiz for a caller, optionally exposing correct answers.
    pub fn view(&self, include_answers: bool) -> QuizView {
        QuizView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            is_active: self.is_active,
            questions: self
                .ordered_questions()
                .into_iter()
                .map(|q| q.view(include_answers))
                .collect(),
        }
    }
}

impl Question {
    pub fn view(&self, include_answer: bool) -> QuestionView {
        QuestionView {
            id: self.id,
            quiz_id: self.quiz_id,
            question_text: self.question_text.clone(),
            question_type: self.question_type,
            options: self.options.clone(),
            points: self.points,
            order: self.order,
            correct_answer: include_answer.then(|| self.correct_answer.clone()),
        }
    }
}

/// Caller-facing quiz representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizView {
    pub id: QuizId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub questions: Vec<QuestionView>,
}

/// Caller-facing question representation. `correct_answer` is only present
/// for callers allowed to see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub points: u32,
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// A validated question ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
    pub order: i32,
}

/// A validated quiz ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub questions: Vec<NewQuestion>,
}

/// A validated partial update. `None` leaves the field untouched; a
/// `Some(questions)` replaces the whole question set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub questions: Option<Vec<NewQuestion>>,
}

/// Access role carried by a user and by their tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Public user representation (no email, no hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// A validated account ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Raw answers keyed by question id, exactly as a participant sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(pub BTreeMap<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: QuestionId, value: impl Into<Value>) {
        self.0.insert(question_id.to_string(), value.into());
    }

    /// The answer for a question, or `None` when it is missing, `null` or an
    /// empty string.
    pub fn get(&self, question_id: QuestionId) -> Option<&Value> {
        match self.0.get(&question_id.to_string()) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(QuestionId, Value)> for Answers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// A recorded, immutable submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub user_id: Option<UserId>,
    pub quiz_id: QuizId,
    pub participant_name: Option<String>,
    pub answers: Answers,
    pub score: u64,
    pub total_points: u64,
    pub submitted_at: DateTime<Utc>,
}

/// A graded submission ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub user_id: Option<UserId>,
    pub quiz_id: QuizId,
    pub participant_name: Option<String>,
    pub answers: Answers,
    pub score: u64,
    pub total_points: u64,
}
