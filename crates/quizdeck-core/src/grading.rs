//! Per-question answer grading.
//!
//! Grading is a pure function of a question and the raw submitted value.
//! It never fails: missing, malformed or unexpected answers are incorrect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Question, QuestionId, QuestionType};

/// Normalize a raw answer value to the text that gets compared.
///
/// Strings are taken as-is, booleans become `True`/`False`, numbers keep
/// their JSON form, and arrays/objects compare as compact JSON.
pub fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether `submitted` is a correct answer to `question`.
pub fn grade(question: &Question, submitted: Option<&Value>) -> bool {
    let Some(value) = submitted.filter(|v| !v.is_null()) else {
        return false;
    };
    let answer = answer_text(value);
    let correct = question.correct_answer.as_str();

    match question.question_type {
        QuestionType::TrueFalse | QuestionType::Text => {
            answer.trim().to_lowercase() == correct.trim().to_lowercase()
        }
        QuestionType::MultipleChoice => answer.trim() == correct.trim(),
        QuestionType::Other => false,
    }
}

/// Points earned for `submitted`: all of the question's points, or none.
pub fn earned_points(question: &Question, submitted: Option<&Value>) -> u32 {
    if grade(question, submitted) {
        question.points
    } else {
        0
    }
}

/// The graded outcome of one question, kept for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub question_id: QuestionId,
    pub question_text: String,
    pub question_type: QuestionType,
    pub user_answer: Option<Value>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points: u32,
    pub earned_points: u32,
}

impl GradeResult {
    /// Grade `submitted` against `question` and capture both answers.
    pub fn compute(question: &Question, submitted: Option<&Value>) -> Self {
        let is_correct = grade(question, submitted);
        Self {
            question_id: question.id,
            question_text: question.question_text.clone(),
            question_type: question.question_type,
            user_answer: submitted.cloned(),
            correct_answer: question.correct_answer.clone(),
            is_correct,
            points: question.points,
            earned_points: if is_correct { question.points } else { 0 },
        }
    }
}
