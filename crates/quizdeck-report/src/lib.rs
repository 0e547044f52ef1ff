//! quizdeck-report: Report rendering.
//!
//! Turns a [`QuizReport`](quizdeck_core::report::QuizReport) into a
//! self-contained HTML page or a JSON gradebook.

pub mod gradebook;
pub mod html;

pub use gradebook::{generate_gradebook, write_gradebook};
pub use html::{generate_html, write_html_report};
