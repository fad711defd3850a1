//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page leads with
//! its positional index and title, then the layout it rendered with and the
//! file it was written to. Untitled steps show their layout in parentheses
//! instead, so the line still says what the page is.
//!
//! # Output Format
//!
//! ```text
//! Intro to Python → index.html
//! 001 Welcome [VideoAndText] → step0.html
//! 002 Functions [TextAndCode] → step1.html
//! 003 (Text) → step2.html
//!
//! Assets
//!     common.css
//!     skulpt/skulpt.js
//!
//! Generated 3 steps, copied 2 assets
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability and a `print_*`
//! wrapper writes to stdout. Format functions are pure: no I/O, no side
//! effects.

use crate::generate::GenerateReport;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format a step line: titled steps show title and layout, untitled show the layout alone.
///
/// ```text
/// 001 Welcome [VideoAndText]   // titled
/// 003 (Text)                   // untitled
/// ```
fn step_line(index: usize, title: &str, layout: &str) -> String {
    if title.is_empty() {
        format!("{} ({})", format_index(index), layout)
    } else {
        format!("{} {} [{}]", format_index(index), title, layout)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format the result of a generation run.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    let index_title = if report.title.is_empty() {
        "Index"
    } else {
        report.title.as_str()
    };
    lines.push(format!("{} \u{2192} {}", index_title, crate::generate::INDEX_FILENAME));

    let mut step_count = 0;
    for (i, page) in report.step_pages().enumerate() {
        lines.push(format!(
            "{} \u{2192} {}",
            step_line(i + 1, &page.title, page.layout.template_name()),
            page.file
        ));
        step_count += 1;
    }

    if !report.copied.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for path in &report.copied {
            lines.push(format!("    {}", path.display()));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, copied {}",
        plural(step_count, "step"),
        plural(report.copied.len(), "asset")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
