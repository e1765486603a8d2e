//! Raw server records to [`Issue`].

use crate::responses::RawIssue;
use crate::types::{Issue, Severity};

/// Line used for file-level issues that report no line at all.
const FILE_LEVEL_LINE: u32 = 1;

/// Map one raw server record onto the internal issue shape.
pub fn normalize(raw: RawIssue) -> Issue {
    let line = raw.line.unwrap_or(FILE_LEVEL_LINE);
    let range = raw.text_range.unwrap_or_default();

    let start_line = range.start_line.unwrap_or(line);
    let end_line = range.end_line.unwrap_or(line).max(start_line);

    Issue {
        file: file_from_component(&raw.component).to_string(),
        key: raw.key,
        severity: raw
            .severity
            .unwrap_or_else(|| Severity::Other("UNKNOWN".to_string())),
        issue_type: raw.issue_type,
        message: raw.message,
        line,
        status: raw.status,
        start_line,
        start_column: range.start_offset.unwrap_or(0),
        end_line,
        end_column: range.end_offset.unwrap_or(0),
        author: raw.author,
    }
}

/// Strip the `"<projectKey>:"` prefix from a component key. Only the first
/// colon separates; the rest belongs to the path.
pub fn file_from_component(component: &str) -> &str {
    component
        .split_once(':')
        .map_or(component, |(_, path)| path)
}
