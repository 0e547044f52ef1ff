//! The `quizdeck grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use quizdeck_core::grading::answer_text;
use quizdeck_core::model::{Answers, NewQuiz, Question, Quiz};
use quizdeck_core::parser::parse_quiz_file;
use quizdeck_core::scoring::score;

pub fn execute(quiz_path: PathBuf, answers: String, format: String) -> Result<()> {
    let file = parse_quiz_file(&quiz_path)?;
    let quiz = offline_quiz(file.to_new_quiz()?);
    let answers = read_answers(&answers)?;

    let card = score(&quiz, &answers);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&card)?),
        "table" => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["#", "Question", "Answer", "Expected", "Result", "Points"]);

            for question in quiz.ordered_questions() {
                let Some(result) = card.results.get(&question.id) else {
                    continue;
                };
                let answer = result
                    .user_answer
                    .as_ref()
                    .map(answer_text)
                    .unwrap_or_else(|| "-".to_string());
                let verdict = if result.is_correct {
                    Cell::new("correct").fg(Color::Green)
                } else {
                    Cell::new("wrong").fg(Color::Red)
                };
                table.add_row(vec![
                    Cell::new(question.id),
                    Cell::new(&question.question_text),
                    Cell::new(answer),
                    Cell::new(&result.correct_answer),
                    verdict,
                    Cell::new(format!("{}/{}", result.earned_points, result.points)),
                ]);
            }

            println!("{}", quiz.title);
            println!("{table}");
            println!(
                "Total: {}/{} ({:.2}%), {} of {} correct",
                card.earned,
                card.total,
                card.percentage,
                card.correct_count(),
                card.results.len()
            );
        }
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

/// An unsaved quiz whose question ids are their 1-based position in the file.
fn offline_quiz(quiz: NewQuiz) -> Quiz {
    let questions = quiz
        .questions
        .into_iter()
        .zip(1..)
        .map(|(q, id)| Question {
            id,
            quiz_id: 0,
            question_text: q.question_text,
            question_type: q.question_type,
            options: q.options,
            correct_answer: q.correct_answer,
            points: q.points,
            order: q.order,
        })
        .collect();

    Quiz {
        id: 0,
        title: quiz.title,
        description: quiz.description,
        created_by: 0,
        created_at: chrono::Utc::now(),
        is_active: quiz.is_active,
        questions,
    }
}

/// Answers given inline as a JSON object, or the path of a JSON file.
fn read_answers(arg: &str) -> Result<Answers> {
    let content = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        let path = Path::new(arg);
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers: {}", path.display()))?
    };
    serde_json::from_str(&content).context("answers must be a JSON object keyed by question number")
}
