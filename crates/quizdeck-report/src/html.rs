//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use quizdeck_core::report::QuizReport;
use quizdeck_core::scoring::percentage;
use quizdeck_core::statistics::QuestionStats;

use crate::gradebook::participant_label;

/// Submissions at or above this percentage are highlighted as passing.
const PASS_MARK: f64 = 50.0;

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Generate an HTML report from a quiz report.
pub fn generate_html(report: &QuizReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizdeck report: {}</title>\n",
        html_escape(&report.quiz.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.quiz.title)));
    if let Some(description) = &report.quiz.description {
        html.push_str(&format!("<p>{}</p>\n", html_escape(description)));
    }
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | {} points | {} submissions | {}{}</p>\n",
        report.quiz.question_count,
        report.quiz.total_points,
        report.stats.submission_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if report.quiz.is_active { "" } else { " | inactive" }
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Average</th><th>Best</th><th>Worst</th><th>Average score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    let fmt_pct = |p: Option<f64>| p.map_or_else(|| "-".to_string(), |p| format!("{p:.2}%"));
    html.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2} / {}</td></tr>\n",
        fmt_pct((report.stats.submission_count > 0).then_some(report.stats.average_percentage)),
        fmt_pct(report.stats.best_percentage),
        fmt_pct(report.stats.worst_percentage),
        report.stats.average_score,
        report.quiz.total_points,
    ));
    html.push_str("</tbody></table>\n");

    // SVG bar chart of per-question correct rates
    if report.stats.submission_count > 0 && !report.stats.per_question.is_empty() {
        html.push_str("<h3>Correct rate per question</h3>\n");
        let ordered: Vec<&QuestionStats> = report
            .questions
            .iter()
            .filter_map(|q| report.stats.per_question.get(&q.id))
            .collect();
        html.push_str(&generate_bar_chart(&ordered));
    }

    html.push_str("</section>\n");

    // Questions
    html.push_str("<section class=\"questions\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Type</th><th>Answer</th><th>Points</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (idx, q) in report.questions.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            idx + 1,
            html_escape(&q.question_text),
            q.question_type,
            html_escape(q.correct_answer.as_deref().unwrap_or("-")),
            q.points
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Submissions
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Submissions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr>");
    for (col, title) in ["Participant", "Submitted", "Score", "Percentage"].iter().enumerate() {
        html.push_str(&format!("<th onclick=\"sortTable({col})\">{title}</th>"));
    }
    html.push_str("</tr></thead>\n");
    html.push_str("<tbody>\n");

    for s in &report.submissions {
        let pct = percentage(s.score, s.total_points);
        let standing = if pct >= PASS_MARK { "passing" } else { "failing" };
        html.push_str(&format!(
            "<tr class=\"{standing}\"><td>{}</td><td data-key=\"{}\">{}</td><td data-key=\"{}\">{}/{}</td><td data-key=\"{pct}\">{pct:.2}%</td></tr>\n",
            html_escape(&participant_label(s)),
            s.submitted_at.timestamp(),
            s.submitted_at.format("%Y-%m-%d %H:%M"),
            s.score,
            s.score,
            s.total_points,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &QuizReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(questions: &[&QuestionStats]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 260;

    let total_height = questions.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, q) in questions.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = q.correct_rate.clamp(0.0, 1.0);
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.8 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        let mut label: String = q.question_text.chars().take(36).collect();
        if q.question_text.chars().count() > 36 {
            label.push_str("...");
        }

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 72rem; margin: 0 auto; padding: 1.5rem; color: #1f2937; }
header { border-bottom: 2px solid #6366f1; padding-bottom: 0.5rem; }
h2 { margin-top: 2.5rem; color: #4338ca; }
.meta { color: #6b7280; font-size: 0.9rem; }
table { border-collapse: collapse; width: 100%; margin: 0.75rem 0; }
th, td { border-bottom: 1px solid #e5e7eb; padding: 0.4rem 0.75rem; text-align: left; }
th { background: #eef2ff; }
#results th { cursor: pointer; user-select: none; }
tr.passing td:last-child { color: #15803d; font-weight: 600; }
tr.failing td:last-child { color: #b91c1c; }
details pre { overflow-x: auto; padding: 0.75rem; background: #f3f4f6; font-size: 0.8rem; }
"#;

/// Sorts the submissions table by a column, using `data-key` when present
/// so dates and scores order numerically.
const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const body = table.tBodies[0];
  const desc = table.dataset.col == col && table.dataset.dir != 'desc';
  const key = (row) => {
    const cell = row.cells[col];
    return cell.dataset.key !== undefined ? parseFloat(cell.dataset.key) : cell.textContent;
  };
  const rows = Array.from(body.rows).sort((a, b) => {
    const ka = key(a), kb = key(b);
    const cmp = typeof ka === 'number' ? ka - kb : String(ka).localeCompare(String(kb));
    return desc ? -cmp : cmp;
  });
  table.dataset.col = col;
  table.dataset.dir = desc ? 'desc' : 'asc';
  rows.forEach((row) => body.appendChild(row));
}
"#;
