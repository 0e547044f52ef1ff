//! Aggregate statistics over a quiz's submissions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grading::grade;
use crate::model::{QuestionId, Quiz, Submission};
use crate::scoring::{percentage, round2};

/// Summary statistics for one quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    /// Number of recorded submissions.
    pub submission_count: usize,
    /// Mean of the per-submission percentages.
    pub average_percentage: f64,
    /// Mean earned score.
    pub average_score: f64,
    pub best_percentage: Option<f64>,
    pub worst_percentage: Option<f64>,
    /// Per-question statistics keyed by question id.
    pub per_question: BTreeMap<QuestionId, QuestionStats>,
}

/// How participants fared on a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: QuestionId,
    pub question_text: String,
    /// Submissions that answered this question at all.
    pub answered: usize,
    /// Submissions whose answer is correct against the current question.
    pub correct: usize,
    /// `correct / submission_count`, in [0, 1].
    pub correct_rate: f64,
}

/// Compute statistics from stored submissions.
///
/// Each stored submission keeps the score it was graded with; per-question
/// figures re-grade the stored answers against the quiz's current questions.
pub fn compute_quiz_stats(quiz: &Quiz, submissions: &[Submission]) -> QuizStats {
    let n = submissions.len();
    let mut per_question = BTreeMap::new();

    for question in quiz.ordered_questions() {
        let answered = submissions
            .iter()
            .filter(|s| s.answers.get(question.id).is_some())
            .count();
        let correct = submissions
            .iter()
            .filter(|s| grade(question, s.answers.get(question.id)))
            .count();
        let correct_rate = if n == 0 {
            0.0
        } else {
            correct as f64 / n as f64
        };
        per_question.insert(
            question.id,
            QuestionStats {
                question_id: question.id,
                question_text: question.question_text.clone(),
                answered,
                correct,
                correct_rate,
            },
        );
    }

    if n == 0 {
        return QuizStats {
            per_question,
            ..Default::default()
        };
    }

    let percentages: Vec<f64> = submissions
        .iter()
        .map(|s| percentage(s.score, s.total_points))
        .collect();
    let average_percentage = round2(percentages.iter().sum::<f64>() / n as f64);
    let average_score = round2(submissions.iter().map(|s| s.score as f64).sum::<f64>() / n as f64);
    let best_percentage = percentages.iter().copied().reduce(f64::max);
    let worst_percentage = percentages.iter().copied().reduce(f64::min);

    QuizStats {
        submission_count: n,
        average_percentage,
        average_score,
        best_percentage,
        worst_percentage,
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answers, Question, QuestionType};
    use chrono::Utc;
    use serde_json::json;

    fn make_quiz() -> Quiz {
        let q = |id: i64, correct: &str, points: u32| Question {
            id,
            quiz_id: 1,
            question_text: format!("Q{id}"),
            question_type: QuestionType::Text,
            options: vec![],
            correct_answer: correct.into(),
            points,
            order: id as i32,
        };
        Quiz {
            id: 1,
            title: "Quiz".into(),
            description: None,
            created_by: 1,
            created_at: Utc::now(),
            is_active: true,
            questions: vec![q(1, "a", 5), q(2, "b", 5)],
        }
    }

    fn submission(id: i64, answers: Answers, score: u64) -> Submission {
        Submission {
            id,
            user_id: None,
            quiz_id: 1,
            participant_name: None,
            answers,
            score,
            total_points: 10,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn no_submissions() {
        let stats = compute_quiz_stats(&make_quiz(), &[]);
        assert_eq!(stats.submission_count, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert!(stats.best_percentage.is_none());
        assert_eq!(stats.per_question.len(), 2);
        assert_eq!(stats.per_question[&1].correct_rate, 0.0);
    }

    #[test]
    fn averages_and_rates() {
        let subs = vec![
            submission(1, [(1, json!("a")), (2, json!("b"))].into_iter().collect(), 10),
            submission(2, [(1, json!("A"))].into_iter().collect(), 5),
            submission(3, [(1, json!("x")), (2, json!("y"))].into_iter().collect(), 0),
        ];
        let stats = compute_quiz_stats(&make_quiz(), &subs);
        assert_eq!(stats.submission_count, 3);
        assert_eq!(stats.average_percentage, 50.0);
        assert_eq!(stats.average_score, 5.0);
        assert_eq!(stats.best_percentage, Some(100.0));
        assert_eq!(stats.worst_percentage, Some(0.0));

        let q1 = &stats.per_question[&1];
        assert_eq!(q1.answered, 3);
        assert_eq!(q1.correct, 2);
        assert!((q1.correct_rate - 2.0 / 3.0).abs() < 1e-9);

        let q2 = &stats.per_question[&2];
        assert_eq!(q2.answered, 2);
        assert_eq!(q2.correct, 1);
    }
}
