//! JSON gradebook export.
//!
//! One row per submission with the points earned on every question, graded
//! against the questions captured in the report.

use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use quizdeck_core::grading::earned_points;
use quizdeck_core::model::{Question, QuestionView, Submission};
use quizdeck_core::report::QuizReport;
use quizdeck_core::scoring::percentage;

fn to_question(view: &QuestionView) -> Question {
    Question {
        id: view.id,
        quiz_id: view.quiz_id,
        question_text: view.question_text.clone(),
        question_type: view.question_type,
        options: view.options.clone(),
        correct_answer: view.correct_answer.clone().unwrap_or_default(),
        points: view.points,
        order: view.order,
    }
}

/// Display name for whoever made a submission.
pub fn participant_label(submission: &Submission) -> String {
    match (&submission.participant_name, submission.user_id) {
        (Some(name), _) => name.clone(),
        (None, Some(user_id)) => format!("user #{user_id}"),
        (None, None) => "anonymous".to_string(),
    }
}

/// Build the gradebook document for a report.
pub fn generate_gradebook(report: &QuizReport) -> Value {
    let questions: Vec<Question> = report.questions.iter().map(to_question).collect();

    let columns: Vec<Value> = questions
        .iter()
        .map(|q| {
            json!({
                "question_id": q.id,
                "question_text": q.question_text,
                "points": q.points,
            })
        })
        .collect();

    let rows: Vec<Value> = report
        .submissions
        .iter()
        .map(|s| {
            let earned: serde_json::Map<String, Value> = questions
                .iter()
                .map(|q| {
                    (
                        q.id.to_string(),
                        json!(earned_points(q, s.answers.get(q.id))),
                    )
                })
                .collect();
            json!({
                "submission_id": s.id,
                "participant": participant_label(s),
                "user_id": s.user_id,
                "submitted_at": s.submitted_at,
                "score": s.score,
                "total_points": s.total_points,
                "percentage": percentage(s.score, s.total_points),
                "earned": earned,
            })
        })
        .collect();

    json!({
        "quiz": {
            "id": report.quiz.id,
            "title": report.quiz.title,
            "total_points": report.quiz.total_points,
        },
        "generated_at": report.created_at,
        "columns": columns,
        "rows": rows,
        "summary": {
            "submission_count": report.stats.submission_count,
            "average_percentage": report.stats.average_percentage,
        },
    })
}

/// Write a gradebook to a file.
pub fn write_gradebook(report: &QuizReport, path: &Path) -> Result<()> {
    let gradebook = generate_gradebook(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&gradebook)?;
    std::fs::write(path, json)?;
    Ok(())
}
