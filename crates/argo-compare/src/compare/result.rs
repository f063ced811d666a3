use serde::Serialize;

/// One affected rendered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the rendered tree root.
    pub path: String,
    /// Unified diff for changed files. File content for added/removed files
    /// when the matching print flag is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileEntry {
    pub fn path_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    pub fn with_content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }
}

/// Outcome of comparing the two rendered trees of one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Present in source only.
    pub added: Vec<FileEntry>,
    /// Present in destination only.
    pub removed: Vec<FileEntry>,
    /// Present in both with different content.
    pub changed: Vec<FileEntry>,
}

impl ComparisonResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}
