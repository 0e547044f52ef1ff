//! Validation of incoming quiz definitions and registrations.
//!
//! Drafts mirror the loose JSON bodies clients send: every field is optional
//! so that a missing field produces a descriptive validation message rather
//! than a deserialization failure.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{NewQuestion, NewQuiz, QuestionType, QuizUpdate, Role};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// A question as submitted by a quiz author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

/// A quiz as submitted for creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionDraft>>,
}

/// A partial quiz update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionDraft>>,
}

/// A registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationDraft {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// A registration that passed validation; the password is still plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

fn invalid(msg: impl Into<String>) -> QuizError {
    QuizError::Validation(msg.into())
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    Some(trimmed(value)).filter(|s| !s.is_empty())
}

/// Validate one question. `position` is the 0-based index in the draft and
/// becomes the stored `order`.
pub fn validate_question(draft: &QuestionDraft, position: usize) -> Result<NewQuestion, QuizError> {
    let n = position + 1;
    let question_text = trimmed(&draft.question_text);
    if question_text.is_empty() {
        return Err(invalid(format!("Question {n}: Question text is required")));
    }

    let question_type: QuestionType = trimmed(&draft.question_type)
        .parse()
        .map_err(|_| invalid(format!("Question {n}: Invalid question type")))?;

    let correct_answer = trimmed(&draft.correct_answer);
    if correct_answer.is_empty() {
        return Err(invalid(format!("Question {n}: Correct answer is required")));
    }

    let points = match draft.points {
        None => 1,
        Some(p) if p >= 1 => u32::try_from(p)
            .map_err(|_| invalid(format!("Question {n}: Points value is too large")))?,
        Some(_) => {
            return Err(invalid(format!(
                "Question {n}: Points must be a positive integer"
            )))
        }
    };

    let options = match question_type {
        QuestionType::MultipleChoice => {
            let options = draft.options.clone().unwrap_or_default();
            if options.len() < MIN_CHOICE_OPTIONS {
                return Err(invalid(format!(
                    "Question {n}: Multiple choice questions require at least 2 options"
                )));
            }
            if !options.iter().any(|o| o == &correct_answer) {
                return Err(invalid(format!(
                    "Question {n}: Correct answer must be one of the options"
                )));
            }
            options
        }
        QuestionType::TrueFalse => {
            let lowered = correct_answer.to_lowercase();
            if lowered != "true" && lowered != "false" {
                return Err(invalid(format!(
                    "Question {n}: True/False questions must have \"True\" or \"False\" as correct answer"
                )));
            }
            Vec::new()
        }
        QuestionType::Text => Vec::new(),
        QuestionType::Other => {
            return Err(invalid(format!("Question {n}: Invalid question type")));
        }
    };

    Ok(NewQuestion {
        question_text,
        question_type,
        options,
        correct_answer,
        points,
        order: i32::try_from(position).unwrap_or(i32::MAX),
    })
}

/// Validate a full question list, which must not be empty.
pub fn validate_questions(drafts: &[QuestionDraft]) -> Result<Vec<NewQuestion>, QuizError> {
    if drafts.is_empty() {
        return Err(invalid("At least one question is required"));
    }
    drafts
        .iter()
        .enumerate()
        .map(|(idx, q)| validate_question(q, idx))
        .collect()
}

/// Validate a quiz creation request.
pub fn validate_quiz_draft(draft: &QuizDraft) -> Result<NewQuiz, QuizError> {
    let title = trimmed(&draft.title);
    if title.is_empty() {
        return Err(invalid("Quiz title is required"));
    }
    let questions = validate_questions(draft.questions.as_deref().unwrap_or_default())?;

    Ok(NewQuiz {
        title,
        description: non_blank(&draft.description),
        is_active: draft.is_active.unwrap_or(true),
        questions,
    })
}

/// Validate a partial update.
pub fn validate_quiz_patch(patch: &QuizPatch) -> Result<QuizUpdate, QuizError> {
    let title = match &patch.title {
        Some(t) if t.trim().is_empty() => return Err(invalid("Quiz title cannot be empty")),
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    let description = patch
        .description
        .as_ref()
        .map(|_| non_blank(&patch.description));
    let questions = patch
        .questions
        .as_deref()
        .map(validate_questions)
        .transpose()?;

    Ok(QuizUpdate {
        title,
        description,
        is_active: patch.is_active,
        questions,
    })
}

/// Validate a registration request.
pub fn validate_registration(draft: &RegistrationDraft) -> Result<ValidRegistration, QuizError> {
    let username = trimmed(&draft.username);
    let email = trimmed(&draft.email).to_lowercase();
    let password = draft.password.clone().unwrap_or_default();
    let role = non_blank(&draft.role).unwrap_or_else(|| "student".into());

    if username.is_empty() {
        return Err(invalid("Username is required"));
    }
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !email.contains('@') {
        return Err(invalid("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("Password must be at least 6 characters"));
    }
    let role: Role = role
        .parse()
        .map_err(|_| invalid("Role must be either \"admin\" or \"student\""))?;

    Ok(ValidRegistration {
        username,
        email,
        password,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(options: &[&str], correct: &str) -> QuestionDraft {
        QuestionDraft {
            question_text: Some("Capital of France?".into()),
            question_type: Some("multiple_choice".into()),
            options: Some(options.iter().map(|s| s.to_string()).collect()),
            correct_answer: Some(correct.into()),
            points: Some(10),
        }
    }

    fn err_message(result: Result<impl std::fmt::Debug, QuizError>) -> String {
        match result {
            Err(QuizError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_multiple_choice() {
        let q = validate_question(&mc(&["Paris", "Rome"], " Paris "), 2).unwrap();
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.correct_answer, "Paris");
        assert_eq!(q.order, 2);
        assert_eq!(q.points, 10);
    }

    #[test]
    fn multiple_choice_needs_two_options() {
        let msg = err_message(validate_question(&mc(&["Paris"], "Paris"), 0));
        assert_eq!(msg, "Question 1: Multiple choice questions require at least 2 options");
    }

    #[test]
    fn multiple_choice_answer_must_be_an_option() {
        let msg = err_message(validate_question(&mc(&["Paris", "Rome"], "paris"), 1));
        assert_eq!(msg, "Question 2: Correct answer must be one of the options");
    }

    #[test]
    fn true_false_answer_checked_case_insensitively() {
        let mut draft = QuestionDraft {
            question_text: Some("Rust has a GC.".into()),
            question_type: Some("TRUE_FALSE".into()),
            options: Some(vec!["True".into(), "False".into()]),
            correct_answer: Some("FALSE".into()),
            points: None,
        };
        let q = validate_question(&draft, 0).unwrap();
        assert_eq!(q.points, 1);
        assert!(q.options.is_empty());

        draft.correct_answer = Some("maybe".into());
        assert!(err_message(validate_question(&draft, 0)).contains("True/False"));
    }

    #[test]
    fn unknown_type_rejected() {
        let draft = QuestionDraft {
            question_text: Some("Essay".into()),
            question_type: Some("essay".into()),
            correct_answer: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            err_message(validate_question(&draft, 0)),
            "Question 1: Invalid question type"
        );
    }

    #[test]
    fn points_must_be_positive() {
        let mut draft = mc(&["a", "b"], "a");
        draft.points = Some(0);
        assert!(err_message(validate_question(&draft, 0)).contains("positive"));
    }

    #[test]
    fn quiz_requires_title_and_questions() {
        let empty = QuizDraft::default();
        assert_eq!(err_message(validate_quiz_draft(&empty)), "Quiz title is required");

        let no_questions = QuizDraft {
            title: Some("Quiz".into()),
            questions: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            err_message(validate_quiz_draft(&no_questions)),
            "At least one question is required"
        );
    }

    #[test]
    fn quiz_defaults() {
        let draft = QuizDraft {
            title: Some("  Geography ".into()),
            description: Some("   ".into()),
            is_active: None,
            questions: Some(vec![mc(&["Paris", "Rome"], "Paris")]),
        };
        let quiz = validate_quiz_draft(&draft).unwrap();
        assert_eq!(quiz.title, "Geography");
        assert_eq!(quiz.description, None);
        assert!(quiz.is_active);
    }

    #[test]
    fn patch_keeps_absent_fields_untouched() {
        let update = validate_quiz_patch(&QuizPatch {
            is_active: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(update.is_active, Some(false));
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.questions.is_none());

        let cleared = validate_quiz_patch(&QuizPatch {
            description: Some(" ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cleared.description, Some(None));
    }

    #[test]
    fn patch_cannot_empty_a_quiz() {
        let patch = QuizPatch {
            questions: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            err_message(validate_quiz_patch(&patch)),
            "At least one question is required"
        );
    }

    #[test]
    fn registration_rules() {
        let ok = validate_registration(&RegistrationDraft {
            username: Some(" alice ".into()),
            email: Some("Alice@Example.COM".into()),
            password: Some("secret1".into()),
            role: None,
        })
        .unwrap();
        assert_eq!(ok.username, "alice");
        assert_eq!(ok.email, "alice@example.com");
        assert_eq!(ok.role, Role::Student);

        let short = RegistrationDraft {
            username: Some("bob".into()),
            email: Some("bob@example.com".into()),
            password: Some("123".into()),
            role: None,
        };
        assert!(err_message(validate_registration(&short)).contains("at least 6"));

        let bad_role = RegistrationDraft {
            password: Some("123456".into()),
            role: Some("teacher".into()),
            ..short.clone()
        };
        assert!(err_message(validate_registration(&bad_role)).contains("Role"));

        let bad_email = RegistrationDraft {
            email: Some("bob.example.com".into()),
            ..short
        };
        assert_eq!(err_message(validate_registration(&bad_email)), "Invalid email format");
    }
}
