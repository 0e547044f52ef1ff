//! The `quizdeck report` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use quizdeck_core::access::Caller;
use quizdeck_core::model::Role;
use quizdeck_core::service::QuizService;
use quizdeck_server::config::load_config_from;

pub async fn execute(
    quiz_id: i64,
    config: Option<PathBuf>,
    output: PathBuf,
    format: String,
) -> Result<()> {
    let (json, html, gradebook) = match format.as_str() {
        "json" => (true, false, false),
        "html" => (false, true, false),
        "gradebook" => (false, false, true),
        "all" => (true, true, true),
        other => anyhow::bail!("unknown format: {other} (expected json, html, gradebook or all)"),
    };

    let config = load_config_from(config.as_deref())?;
    let store = quizdeck_store::open_store(&config.database_url).await?;
    let service = QuizService::new(store);

    // Local exports act with admin rights over the configured database.
    let operator = Caller::user(0, Role::Admin);
    let report = service
        .quiz_report(&operator, quiz_id)
        .await
        .with_context(|| format!("failed to build report for quiz {quiz_id}"))?;

    println!("{}", report.to_markdown());

    std::fs::create_dir_all(&output)?;
    let stem = format!("quiz-{quiz_id}");
    if json {
        let path = output.join(format!("{stem}.json"));
        report.save_json(&path)?;
        println!("Report saved to {}", path.display());
    }
    if html {
        let path = output.join(format!("{stem}.html"));
        quizdeck_report::html::write_html_report(&report, &path)?;
        println!("HTML report saved to {}", path.display());
    }
    if gradebook {
        let path = output.join(format!("{stem}-gradebook.json"));
        quizdeck_report::gradebook::write_gradebook(&report, &path)?;
        println!("Gradebook saved to {}", path.display());
    }

    Ok(())
}
