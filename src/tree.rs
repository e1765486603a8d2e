//! Side-panel tree model.
//!
//! Nodes are plain data. A host adapter walks them and renders whatever
//! widget it owns; nothing here knows about a concrete UI.

use serde::Serialize;

use crate::diagnostics::Range;
use crate::group::{base_name, group, Group, GroupingMode};
use crate::types::{Issue, PagingInfo, Severity, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode<'a> {
    Summary(SummaryNode),
    Author(BucketNode<'a>),
    File(BucketNode<'a>),
    Issue(IssueNode<'a>),
}

impl<'a> TreeNode<'a> {
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Summary(node) => &node.label,
            TreeNode::Author(node) | TreeNode::File(node) => &node.label,
            TreeNode::Issue(node) => &node.label,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TreeNode::Summary(node) => &node.description,
            TreeNode::Author(node) | TreeNode::File(node) => &node.description,
            TreeNode::Issue(node) => &node.description,
        }
    }

    /// Leaf issue nodes under a bucket; empty for every other node kind.
    pub fn children(&self) -> Vec<TreeNode<'a>> {
        match self {
            TreeNode::Author(node) | TreeNode::File(node) => {
                node.children.iter().cloned().map(TreeNode::Issue).collect()
            }
            TreeNode::Summary(_) | TreeNode::Issue(_) => Vec::new(),
        }
    }
}

/// Leading pagination entry. Not a bucket; never has children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryNode {
    pub label: String,
    pub description: String,
    pub page_index: u32,
    pub total_pages: u64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SummaryNode {
    /// `None` when there is nothing to page through.
    pub fn new(paging: &PagingInfo, branch: Option<&str>) -> Option<Self> {
        if paging.total == 0 {
            return None;
        }

        let total_pages = paging.total_pages();
        let page = format!("Page {} of {total_pages}", paging.page_index);
        let label = match branch {
            Some(branch) => format!("{branch} - {page}"),
            None => page,
        };

        Some(Self {
            label,
            description: format!("(Total: {})", paging.total),
            page_index: paging.page_index,
            total_pages,
            total: paging.total,
            branch: branch.map(String::from),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketNode<'a> {
    pub label: String,
    pub description: String,
    pub count: usize,
    pub children: Vec<IssueNode<'a>>,
}

/// Action a leaf carries: open `file` with `range` selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenLocation<'a> {
    pub file: &'a str,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueNode<'a> {
    pub label: String,
    pub description: String,
    pub tooltip: String,
    pub severity: &'a Severity,
    pub action: OpenLocation<'a>,
    #[serde(skip)]
    pub issue: &'a Issue,
}

impl<'a> IssueNode<'a> {
    fn new(issue: &'a Issue, show_file_name: bool) -> Self {
        let description = if show_file_name {
            format!("{}:L{}", base_name(&issue.file), issue.line)
        } else {
            format!("L{}", issue.line)
        };

        Self {
            label: issue.message.clone(),
            description,
            tooltip: format!("{}: {}", issue.severity, issue.message),
            severity: &issue.severity,
            action: OpenLocation {
                file: &issue.file,
                range: Range::of(issue),
            },
            issue,
        }
    }
}

/// Project the last fetched result into root nodes: the summary entry (when
/// `total > 0`) followed by one bucket per group.
pub fn build_tree(result: &SyncResult, mode: GroupingMode) -> Vec<TreeNode<'_>> {
    let mut nodes = Vec::new();

    if let Some(summary) = SummaryNode::new(&result.paging, result.branch.as_deref()) {
        nodes.push(TreeNode::Summary(summary));
    }

    nodes.extend(
        group(&result.issues, mode)
            .into_iter()
            .map(|g| bucket_node(g, mode)),
    );

    nodes
}

fn bucket_node(group: Group<'_>, mode: GroupingMode) -> TreeNode<'_> {
    let count = group.count();
    match mode {
        GroupingMode::Author => TreeNode::Author(BucketNode {
            label: group.label,
            description: format!("({count})"),
            count,
            children: group
                .issues
                .into_iter()
                .map(|issue| IssueNode::new(issue, true))
                .collect(),
        }),
        GroupingMode::File => TreeNode::File(BucketNode {
            label: group.label,
            description: group.description.unwrap_or_default(),
            count,
            children: group
                .issues
                .into_iter()
                .map(|issue| IssueNode::new(issue, false))
                .collect(),
        }),
    }
}
