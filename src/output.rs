use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;
use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::tree::TreeNode;

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    OUTPUT_JSON.store(matches!(format, OutputFormat::Json), Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print one JSON object tagged with `event`, one per line.
pub fn print_event<T: Serialize>(event: &str, payload: T) {
    let line = json!({ "event": event, "data": payload });
    println!("{line}");
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a success message (skipped when quiet)
pub fn print_message(message: &str) {
    if is_quiet() {
        return;
    }
    if is_json_output() {
        print_event("message", message);
    } else {
        println!("{message}");
    }
}

/// Print an error message to stderr, never suppressed
pub fn print_error(message: &str) {
    if is_json_output() {
        print_event("error", message);
    } else {
        eprintln!("{}", message.red());
    }
}

/// Format a diagnostic severity with color
pub fn diagnostic_severity_colored(severity: DiagnosticSeverity) -> String {
    let label = severity.label();
    match severity {
        DiagnosticSeverity::Error => label.red().bold().to_string(),
        DiagnosticSeverity::Warning => label.yellow().bold().to_string(),
        DiagnosticSeverity::Information => label.blue().to_string(),
        DiagnosticSeverity::Hint => label.bright_black().to_string(),
    }
}

#[derive(Tabled)]
struct DiagnosticRow {
    #[tabled(rename = "Line")]
    line: u32,
    #[tabled(rename = "Col")]
    column: u32,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            line: diagnostic.range.start.line + 1,
            column: diagnostic.range.start.character,
            severity: diagnostic_severity_colored(diagnostic.severity),
            message: truncate(&diagnostic.message, 100),
        }
    }
}

/// Print the diagnostics of one file as a table under a path heading
pub fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    println!("{}", path.display().to_string().bold());
    let rows: Vec<DiagnosticRow> = diagnostics.iter().map(DiagnosticRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Render tree nodes with two-space indentation per level
pub fn print_tree(nodes: &[TreeNode<'_>]) {
    for node in nodes {
        print_node(node, 0);
    }
}

fn print_node(node: &TreeNode<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let description = node.description().bright_black();
    match node {
        TreeNode::Summary(_) => println!("{indent}{} {description}", node.label().cyan().bold()),
        TreeNode::Author(_) | TreeNode::File(_) => {
            println!("{indent}{} {description}", node.label().bold())
        }
        TreeNode::Issue(leaf) => println!(
            "{indent}{} {} {description}",
            leaf.issue.severity.colored(),
            node.label()
        ),
    }

    for child in node.children() {
        print_node(&child, depth + 1);
    }
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
