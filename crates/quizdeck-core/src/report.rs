//! Quiz report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{QuestionView, Quiz, QuizId, Submission};
use crate::statistics::QuizStats;

/// An exported snapshot of a quiz and everything submitted to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    /// Questions with their correct answers, in grading order.
    pub questions: Vec<QuestionView>,
    /// Submissions, newest first.
    pub submissions: Vec<Submission>,
    pub stats: QuizStats,
}

/// Summary of a quiz (without the question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub question_count: usize,
    pub total_points: u64,
}

impl QuizSummary {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            is_active: quiz.is_active,
            question_count: quiz.questions.len(),
            total_points: quiz.total_points(),
        }
    }
}

impl QuizReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render a short Markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", self.quiz.title));
        md.push_str(&format!(
            "{} questions, {} points, {} submissions\n\n",
            self.quiz.question_count, self.quiz.total_points, self.stats.submission_count
        ));
        if self.stats.submission_count > 0 {
            md.push_str(&format!(
                "Average: {:.2}% (best {:.2}%, worst {:.2}%)\n\n",
                self.stats.average_percentage,
                self.stats.best_percentage.unwrap_or(0.0),
                self.stats.worst_percentage.unwrap_or(0.0)
            ));
        }
        md.push_str("| Question | Answered | Correct | Rate |\n");
        md.push_str("|---|---|---|---|\n");
        for q in self.stats.per_question.values() {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                q.question_text.replace('|', "\\|"),
                q.answered,
                q.correct,
                q.correct_rate * 100.0
            ));
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answers, Question, QuestionType};
    use crate::statistics::compute_quiz_stats;
    use serde_json::json;

    fn make_report() -> QuizReport {
        let quiz = Quiz {
            id: 4,
            title: "Containers".into(),
            description: Some("Docker basics".into()),
            created_by: 1,
            created_at: Utc::now(),
            is_active: true,
            questions: vec![Question {
                id: 10,
                quiz_id: 4,
                question_text: "Unit of deployment?".into(),
                question_type: QuestionType::Text,
                options: vec![],
                correct_answer: "container".into(),
                points: 5,
                order: 0,
            }],
        };
        let answers: Answers = [(10, json!("Container"))].into_iter().collect();
        let submissions = vec![Submission {
            id: 1,
            user_id: None,
            quiz_id: 4,
            participant_name: Some("Ada".into()),
            answers,
            score: 5,
            total_points: 5,
            submitted_at: Utc::now(),
        }];
        let stats = compute_quiz_stats(&quiz, &submissions);
        QuizReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary::from_quiz(&quiz),
            questions: quiz.view(true).questions,
            submissions,
            stats,
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = QuizReport::load_json(&path).unwrap();

        assert_eq!(loaded.quiz.title, "Containers");
        assert_eq!(loaded.submissions.len(), 1);
        assert_eq!(loaded.stats.submission_count, 1);
        assert_eq!(loaded.questions[0].correct_answer.as_deref(), Some("container"));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(QuizReport::load_json(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.contains("# Containers"));
        assert!(md.contains("Unit of deployment?"));
        assert!(md.contains("100.0%"));
    }
}
