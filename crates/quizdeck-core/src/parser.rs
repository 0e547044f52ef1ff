//! TOML quiz definition parser.
//!
//! Loads quiz definitions from TOML files and directories, and lints them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::NewQuiz;
use crate::validation::{validate_quiz_draft, QuestionDraft, QuizDraft};

/// Intermediate TOML structure for quiz definition files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<QuestionDraft>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A parsed, not yet validated, quiz definition.
#[derive(Debug, Clone)]
pub struct QuizFile {
    /// Where the definition was read from.
    pub source: PathBuf,
    pub draft: QuizDraft,
}

impl QuizFile {
    /// Validate the definition into a storable quiz.
    pub fn to_new_quiz(&self) -> Result<NewQuiz> {
        validate_quiz_draft(&self.draft)
            .map_err(|e| anyhow::anyhow!("{}: {e}", self.source.display()))
    }

    pub fn title(&self) -> &str {
        self.draft.title.as_deref().unwrap_or("")
    }

    pub fn question_count(&self) -> usize {
        self.draft.questions.as_ref().map_or(0, Vec::len)
    }
}

/// Parse a single TOML file into a `QuizFile`.
pub fn parse_quiz_file(path: &Path) -> Result<QuizFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `QuizFile` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizFile> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(QuizFile {
        source: source_path.to_path_buf(),
        draft: QuizDraft {
            title: Some(parsed.quiz.title),
            description: parsed.quiz.description,
            is_active: Some(parsed.quiz.is_active),
            questions: Some(parsed.questions),
        },
    })
}

/// Recursively load all `.toml` quiz files from a directory, sorted by path.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizFile>> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            files.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_file(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(files)
}

/// Load a single file or every file under a directory.
pub fn load_quiz_path(path: &Path) -> Result<Vec<QuizFile>> {
    if path.is_dir() {
        load_quiz_directory(path)
    } else {
        Ok(vec![parse_quiz_file(path)?])
    }
}

/// A lint finding that does not make the quiz invalid.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Outcome of checking a quiz file.
#[derive(Debug, Clone, Default)]
pub struct FileCheck {
    /// The hard validation failure, if the quiz would be rejected.
    pub error: Option<String>,
    pub warnings: Vec<ValidationWarning>,
}

/// Validate a quiz file and lint it for common authoring mistakes.
pub fn validate_quiz_file(file: &QuizFile) -> FileCheck {
    let error = validate_quiz_draft(&file.draft).err().map(|e| e.to_string());
    let mut warnings = Vec::new();

    if file.draft.is_active == Some(false) {
        warnings.push(ValidationWarning {
            question: None,
            message: "quiz is inactive and will not be visible to participants".into(),
        });
    }

    let questions = file.draft.questions.as_deref().unwrap_or_default();

    // Duplicate question text
    let mut seen_text = HashSet::new();
    for (idx, q) in questions.iter().enumerate() {
        let text = q.question_text.as_deref().unwrap_or("").trim().to_lowercase();
        if !text.is_empty() && !seen_text.insert(text) {
            warnings.push(ValidationWarning {
                question: Some(idx + 1),
                message: "duplicate question text".into(),
            });
        }
    }

    for (idx, q) in questions.iter().enumerate() {
        let ty = q.question_type.as_deref().unwrap_or("").trim().to_lowercase();
        let options = q.options.as_deref().unwrap_or_default();
        let correct = q.correct_answer.as_deref().unwrap_or("").trim();

        if ty != "multiple_choice" {
            if !options.is_empty() {
                warnings.push(ValidationWarning {
                    question: Some(idx + 1),
                    message: format!("options are ignored for {ty} questions"),
                });
            }
            continue;
        }

        let mut seen_options = HashSet::new();
        for option in options {
            if !seen_options.insert(option.as_str()) {
                warnings.push(ValidationWarning {
                    question: Some(idx + 1),
                    message: format!("duplicate option: {option}"),
                });
            }
        }

        // Choice grading is case-sensitive, so a near miss is almost always a typo.
        let exact = options.iter().any(|o| o == correct);
        let near = options
            .iter()
            .any(|o| o.trim().to_lowercase() == correct.to_lowercase());
        if !exact && near {
            warnings.push(ValidationWarning {
                question: Some(idx + 1),
                message: "correct answer differs from an option only by case or whitespace"
                    .into(),
            });
        }
    }

    FileCheck { error, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[quiz]
title = "Python Basics"
description = "Test your knowledge of fundamental Python concepts"

[[questions]]
question_text = "What is Python?"
question_type = "multiple_choice"
options = ["A programming language", "A snake", "A framework", "A database"]
correct_answer = "A programming language"
points = 10

[[questions]]
question_text = "Python is a dynamically typed language."
question_type = "true_false"
correct_answer = "True"
points = 5

[[questions]]
question_text = "Which keyword defines a function?"
question_type = "text"
correct_answer = "def"
"#;

    #[test]
    fn parse_valid_toml() {
        let file = parse_quiz_str(VALID_TOML, Path::new("python.toml")).unwrap();
        assert_eq!(file.title(), "Python Basics");
        assert_eq!(file.question_count(), 3);

        let quiz = file.to_new_quiz().unwrap();
        assert!(quiz.is_active);
        assert_eq!(quiz.questions[0].points, 10);
        assert_eq!(quiz.questions[2].points, 1);
        assert_eq!(quiz.questions[2].order, 2);

        let check = validate_quiz_file(&file);
        assert!(check.error.is_none());
        assert!(check.warnings.is_empty(), "{:?}", check.warnings);
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_str(bad, Path::new("bad.toml")).is_err());
    }

    #[test]
    fn invalid_definition_reports_error_with_source() {
        let toml = r#"
[quiz]
title = "Broken"

[[questions]]
question_text = "Pick one"
question_type = "multiple_choice"
options = ["a"]
correct_answer = "a"
"#;
        let file = parse_quiz_str(toml, Path::new("broken.toml")).unwrap();
        let check = validate_quiz_file(&file);
        assert!(check.error.unwrap().contains("at least 2 options"));

        let err = file.to_new_quiz().unwrap_err().to_string();
        assert!(err.starts_with("broken.toml"));
    }

    #[test]
    fn lint_warnings() {
        let toml = r#"
[quiz]
title = "Lint"
is_active = false

[[questions]]
question_text = "Capital?"
question_type = "multiple_choice"
options = ["Paris", "Paris ", "Rome", "Rome"]
correct_answer = "paris"

[[questions]]
question_text = "capital?"
question_type = "text"
options = ["unused"]
correct_answer = "x"
"#;
        let file = parse_quiz_str(toml, Path::new("lint.toml")).unwrap();
        let check = validate_quiz_file(&file);
        let messages: Vec<&str> = check.warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("inactive")));
        assert!(messages.iter().any(|m| m.contains("duplicate question text")));
        assert!(messages.iter().any(|m| m.contains("duplicate option: Rome")));
        assert!(messages.iter().any(|m| m.contains("only by case")));
        assert!(messages.iter().any(|m| m.contains("ignored for text")));
        // "paris" is not an exact option, so the quiz itself is invalid too.
        assert!(check.error.is_some());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(load_quiz_directory(&dir.path().join("b.toml")).is_err());
    }
}
