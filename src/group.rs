//! Bucketing of a flat issue list by author or by file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::Issue;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Key the issue tree is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    #[default]
    Author,
    File,
}

impl GroupingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Author => Self::File,
            Self::File => Self::Author,
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author => write!(f, "author"),
            Self::File => write!(f, "file"),
        }
    }
}

/// One bucket of issues. Borrows from the issue slice it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub label: String,
    /// Secondary text; the full path in file mode.
    pub description: Option<String>,
    pub issues: Vec<&'a Issue>,
}

impl Group<'_> {
    pub fn count(&self) -> usize {
        self.issues.len()
    }
}

/// Bucket `issues` by `mode`. Buckets are sorted by their key; issues keep
/// their input order within a bucket.
pub fn group(issues: &[Issue], mode: GroupingMode) -> Vec<Group<'_>> {
    match mode {
        GroupingMode::Author => bucket(issues, |issue| {
            issue.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
        })
        .into_iter()
        .map(|(author, issues)| Group {
            label: author.to_string(),
            description: None,
            issues,
        })
        .collect(),
        GroupingMode::File => bucket(issues, |issue| issue.file.as_str())
            .into_iter()
            .map(|(file, issues)| Group {
                label: base_name(file).to_string(),
                description: Some(file.to_string()),
                issues,
            })
            .collect(),
    }
}

fn bucket<'a, F>(issues: &'a [Issue], key: F) -> BTreeMap<&'a str, Vec<&'a Issue>>
where
    F: Fn(&'a Issue) -> &'a str,
{
    let mut buckets: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        buckets.entry(key(issue)).or_default().push(issue);
    }
    buckets
}

/// Last path component, or the whole path when it has none.
pub fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueStatus, Severity};

    fn issue(key: &str, file: &str, author: Option<&str>) -> Issue {
        Issue {
            key: key.to_string(),
            severity: Severity::Major,
            issue_type: "CODE_SMELL".to_string(),
            message: format!("message {key}"),
            file: file.to_string(),
            line: 1,
            status: IssueStatus::Open,
            start_line: 1,
            start_column: 0,
            end_line: 1,
            end_column: 0,
            author: author.map(String::from),
        }
    }

    fn keys(group: &Group<'_>) -> Vec<String> {
        group.issues.iter().map(|i| i.key.clone()).collect()
    }

    #[test]
    fn test_group_by_author_orders_labels() {
        let issues = vec![
            issue("1", "a.ts", Some("bob")),
            issue("2", "a.ts", None),
            issue("3", "b.ts", Some("amy")),
        ];

        let groups = group(&issues, GroupingMode::Author);
        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        let counts: Vec<_> = groups.iter().map(Group::count).collect();

        assert_eq!(labels, vec!["Unknown Author", "amy", "bob"]);
        assert_eq!(counts, vec![1, 1, 1]);
        assert!(groups.iter().all(|g| g.description.is_none()));
    }

    #[test]
    fn test_group_by_file_keeps_input_order_within_bucket() {
        let issues = vec![
            issue("3", "src/z.ts", None),
            issue("1", "src/a.ts", None),
            issue("9", "src/z.ts", None),
            issue("2", "src/z.ts", None),
        ];

        let groups = group(&issues, GroupingMode::File);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "a.ts");
        assert_eq!(groups[0].description.as_deref(), Some("src/a.ts"));
        assert_eq!(groups[1].label, "z.ts");
        assert_eq!(keys(&groups[1]), vec!["3", "9", "2"]);
    }

    #[test]
    fn test_group_by_file_sorts_by_full_path_not_label() {
        let issues = vec![
            issue("1", "b/a.ts", None),
            issue("2", "a/z.ts", None),
        ];

        let groups = group(&issues, GroupingMode::File);
        let descriptions: Vec<_> = groups
            .iter()
            .filter_map(|g| g.description.as_deref())
            .collect();
        assert_eq!(descriptions, vec!["a/z.ts", "b/a.ts"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group(&[], GroupingMode::Author).is_empty());
        assert!(group(&[], GroupingMode::File).is_empty());
    }

    #[test]
    fn test_toggle() {
        assert_eq!(GroupingMode::default(), GroupingMode::Author);
        assert_eq!(GroupingMode::Author.toggled(), GroupingMode::File);
        assert_eq!(GroupingMode::File.toggled(), GroupingMode::Author);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("src/app/main.ts"), "main.ts");
        assert_eq!(base_name("main.ts"), "main.ts");
    }
}
