//! The `quizdeck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizdeck.toml").exists() {
        println!("quizdeck.toml already exists, skipping.");
    } else {
        std::fs::write("quizdeck.toml", SAMPLE_CONFIG)?;
        println!("Created quizdeck.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set jwt_secret in quizdeck.toml (or export JWT_SECRET_KEY)");
    println!("  2. Run: quizdeck validate --quizzes quizzes");
    println!("  3. Run: quizdeck seed --quizzes quizzes");
    println!("  4. Run: quizdeck serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdeck configuration

database_url = "sqlite://quiz_app.db"
host = "0.0.0.0"
port = 5000
jwt_secret = "${JWT_SECRET_KEY}"
jwt_expires_secs = 3600
cors_origins = ["http://localhost:5173"]
allow_admin_registration = false
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
title = "Rust Basics"
description = "A short quiz to get started"

[[questions]]
question_text = "Which keyword declares an immutable binding?"
question_type = "multiple_choice"
options = ["let", "mut", "const", "static"]
correct_answer = "let"
points = 10

[[questions]]
question_text = "Rust has a garbage collector."
question_type = "true_false"
correct_answer = "False"
points = 5

[[questions]]
question_text = "Which tool builds Rust projects and manages their dependencies?"
question_type = "text"
correct_answer = "cargo"
points = 10
"#;
