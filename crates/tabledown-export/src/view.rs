//! Snapshot of the host's active view.

use tabledown::Node;

/// How the active document is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Rendered, read-only
    Preview,
    /// Raw Markdown source being edited
    Source,
}

/// The active Markdown view, handed over by the host for one command run.
#[derive(Debug, Clone)]
pub struct MarkdownView {
    /// Vault path of the open document, if the view has one
    pub file: Option<String>,
    pub mode: ViewMode,
    /// The view's content element as rendered
    pub content: Node,
}

impl MarkdownView {
    pub fn new(file: impl Into<String>, mode: ViewMode, content: Node) -> Self {
        Self {
            file: Some(file.into()),
            mode,
            content,
        }
    }

    pub fn preview(file: impl Into<String>, content: Node) -> Self {
        Self::new(file, ViewMode::Preview, content)
    }

    pub fn is_preview(&self) -> bool {
        self.mode == ViewMode::Preview
    }
}
