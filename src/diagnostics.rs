//! Issue to editor diagnostic projection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Issue, Severity};

/// Source label attached to every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "SonarQube";

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl DiagnosticSeverity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        }
    }
}

impl From<&Severity> for DiagnosticSeverity {
    fn from(severity: &Severity) -> Self {
        match severity {
            Severity::Blocker | Severity::Critical => Self::Error,
            Severity::Major => Self::Warning,
            Severity::Minor => Self::Information,
            Severity::Info => Self::Hint,
            Severity::Other(_) => Self::Information,
        }
    }
}

/// 0-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Convert an issue's 1-based line range into a 0-based editor range.
    pub fn of(issue: &Issue) -> Self {
        Self {
            start: Position {
                line: issue.start_line.saturating_sub(1),
                character: issue.start_column,
            },
            end: Position {
                line: issue.end_line.saturating_sub(1),
                character: issue.end_column,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub source: &'static str,
}

impl From<&Issue> for Diagnostic {
    fn from(issue: &Issue) -> Self {
        let message = match &issue.author {
            Some(author) => format!("{} (Author: {author})", issue.message),
            None => issue.message.clone(),
        };

        Self {
            range: Range::of(issue),
            message,
            severity: DiagnosticSeverity::from(&issue.severity),
            source: DIAGNOSTIC_SOURCE,
        }
    }
}

/// Diagnostics grouped by workspace-relative file, files in path order,
/// diagnostics in issue order.
pub fn project(issues: &[Issue]) -> BTreeMap<String, Vec<Diagnostic>> {
    let mut by_file: BTreeMap<String, Vec<Diagnostic>> = BTreeMap::new();
    for issue in issues {
        by_file
            .entry(issue.file.clone())
            .or_default()
            .push(Diagnostic::from(issue));
    }
    by_file
}
