//! CLI output formatting for pipeline runs.
//!
//! # Output Format
//!
//! ```text
//! Locales
//! 001 de → models/de.json (3 phrases)
//! 002 en → models/en.json (12 phrases)
//!     You may want to add a file config-en.json to your magicModel folder
//! 003 es skipped
//!     You may want to add a file es-template.json to your magicModel folder
//!
//! Built 2 locales, 1 skipped, 0 failed
//! ```
//!
//! Each locale gets a header line with its position and status, followed by
//! its diagnostics indented underneath. `check` runs show `ok` instead of
//! the target path.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O; `print_*`
//! wrappers write them to stdout.

use crate::types::{LocaleOutcome, LocaleStatus, RunReport};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Header line for one locale.
///
/// With an output directory, written locales show their target path;
/// without one (a `check` run) they show `ok`.
fn locale_line(index: usize, outcome: &LocaleOutcome, output_dir: Option<&Path>) -> String {
    let head = format!("{} {}", format_index(index), outcome.locale);
    match &outcome.status {
        LocaleStatus::Written { phrases, .. } => {
            let phrases = plural(*phrases, "phrase", "phrases");
            match output_dir {
                Some(dir) => {
                    let target = dir.join(crate::naming::model_file(&outcome.locale));
                    format!("{head} → {} ({phrases})", target.display())
                }
                None => format!("{head} ok ({phrases})"),
            }
        }
        LocaleStatus::Skipped => format!("{head} skipped"),
        LocaleStatus::Failed => format!("{head} failed"),
    }
}

/// Format a run report. `output_dir` is `None` for runs that wrote nothing.
pub fn format_run_report(report: &RunReport, output_dir: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();

    if report.locales.is_empty() {
        lines.push("No locales to build".to_string());
        return lines;
    }

    lines.push("Locales".to_string());
    for (i, outcome) in report.locales.iter().enumerate() {
        lines.push(locale_line(i + 1, outcome, output_dir));
        for diagnostic in &outcome.diagnostics {
            lines.push(format!("{}{}", indent(1), diagnostic));
        }
    }

    lines.push(String::new());
    let verb = if output_dir.is_some() { "Built" } else { "Checked" };
    lines.push(format!(
        "{verb} {}, {} skipped, {} failed",
        plural(report.written(), "locale", "locales"),
        report.skipped(),
        report.failed()
    ));
    lines
}

pub fn print_run_report(report: &RunReport, output_dir: Option<&Path>) {
    for line in format_run_report(report, output_dir) {
        println!("{}", line);
    }
}
