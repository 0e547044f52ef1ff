//! Score aggregation across a quiz.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grading::GradeResult;
use crate::model::{Answers, QuestionId, Quiz};

/// The aggregated score of one set of answers against a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Points earned on correctly answered questions.
    pub earned: u64,
    /// Points available across the whole quiz, answered or not.
    pub total: u64,
    /// `earned / total * 100`, rounded to two decimals; 0 for an empty quiz.
    pub percentage: f64,
    /// Per-question breakdown keyed by question id.
    pub results: BTreeMap<QuestionId, GradeResult>,
}

impl ScoreCard {
    pub fn correct_count(&self) -> usize {
        self.results.values().filter(|r| r.is_correct).count()
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `earned` over `total`, 0 when there is nothing to earn.
pub fn percentage(earned: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(earned as f64 / total as f64 * 100.0)
}

/// Grade every question of `quiz` against `answers` in stored order.
pub fn score(quiz: &Quiz, answers: &Answers) -> ScoreCard {
    let mut earned = 0u64;
    let mut total = 0u64;
    let mut results = BTreeMap::new();

    for question in quiz.ordered_questions() {
        let result = GradeResult::compute(question, answers.get(question.id));
        total += u64::from(question.points);
        earned += u64::from(result.earned_points);
        results.insert(question.id, result);
    }

    ScoreCard {
        earned,
        total,
        percentage: percentage(earned, total),
        results,
    }
}
