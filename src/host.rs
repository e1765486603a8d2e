//! The editor-side surfaces a sync cycle writes to.
//!
//! [`Host`] is the seam between the orchestrator and whatever UI owns the
//! status line, notifications, diagnostics collection and tree view.
//! [`TerminalHost`] renders them on stdout/stderr.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::diagnostics::Diagnostic;
use crate::output;
use crate::tree::TreeNode;

/// Transient status-bar text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Status {
    Syncing { page: u32 },
    Ready { total: u64 },
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Syncing { page } => write!(f, "Sonar: Syncing (Page {page})..."),
            Status::Ready { total } => write!(f, "Sonar: {total}"),
            Status::Error => write!(f, "Sonar: Sync Error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible popup message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Host {
    fn set_status(&mut self, status: Status);

    fn notify(&mut self, notice: Notice);

    /// Drop every diagnostic previously published.
    fn clear_diagnostics(&mut self);

    /// Publish the diagnostics for one resolved file path.
    fn set_diagnostics(&mut self, path: &Path, diagnostics: Vec<Diagnostic>);

    /// Replace the tree view's root nodes.
    fn show_tree(&mut self, nodes: &[TreeNode<'_>]);
}

/// Host-side diagnostics collection keyed by resolved file path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticCollection {
    files: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn set(&mut self, path: PathBuf, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            self.files.remove(&path);
        } else {
            self.files.insert(path, diagnostics);
        }
    }

    #[cfg(test)]
    pub fn get(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Renders host surfaces to the terminal, as text or as NDJSON events.
pub struct TerminalHost {
    collection: DiagnosticCollection,
    show_diagnostics: bool,
}

impl TerminalHost {
    pub fn new(show_diagnostics: bool) -> Self {
        Self {
            collection: DiagnosticCollection::default(),
            show_diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.collection
    }
}

impl Host for TerminalHost {
    fn set_status(&mut self, status: Status) {
        if output::is_json_output() {
            output::print_event("status", status);
        } else if !output::is_quiet() {
            let text = status.to_string();
            match status {
                Status::Error => eprintln!("{}", text.red()),
                _ => eprintln!("{}", text.bright_black()),
            }
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => output::print_message(&notice.message),
            NoticeLevel::Error => output::print_error(&notice.message),
        }
    }

    fn clear_diagnostics(&mut self) {
        self.collection.clear();
        if output::is_json_output() && self.show_diagnostics {
            output::print_event("diagnostics_cleared", json!({}));
        }
    }

    fn set_diagnostics(&mut self, path: &Path, diagnostics: Vec<Diagnostic>) {
        if self.show_diagnostics {
            if output::is_json_output() {
                output::print_event(
                    "diagnostics",
                    json!({ "path": path, "diagnostics": &diagnostics }),
                );
            } else {
                output::print_diagnostics(path, &diagnostics);
            }
        }
        self.collection.set(path.to_path_buf(), diagnostics);
    }

    fn show_tree(&mut self, nodes: &[TreeNode<'_>]) {
        if output::is_json_output() {
            output::print_event("tree", nodes);
        } else if nodes.is_empty() {
            println!("{}", "No issues.".bright_black());
        } else {
            output::print_tree(nodes);
        }
    }
}
