//! The `quizdeck validate` command.

use std::path::PathBuf;

use anyhow::Result;
use quizdeck_core::parser::{load_quiz_path, validate_quiz_file};

pub fn execute(quizzes_path: PathBuf) -> Result<()> {
    let files = load_quiz_path(&quizzes_path)?;
    if files.is_empty() {
        anyhow::bail!("no quiz definitions found in {}", quizzes_path.display());
    }

    let mut total_warnings = 0;
    let mut invalid = 0;

    for file in &files {
        println!("Quiz: {} ({} questions)", file.title(), file.question_count());

        let check = validate_quiz_file(file);
        if let Some(error) = &check.error {
            println!("  ERROR: {error}");
            invalid += 1;
        }
        for w in &check.warnings {
            let prefix = w
                .question
                .map(|n| format!("  [question {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += check.warnings.len();
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} invalid quiz definition(s)");
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
