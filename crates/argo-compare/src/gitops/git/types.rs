//! Pure data types for git plumbing output.

use serde::{Deserialize, Serialize};

/// Kind of change between two trees, seen from the newer tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One path changed between two trees.
///
/// An absent `old_name` means the path was added, an absent `new_name`
/// means it was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeChange {
    /// Path in the older (target branch) tree.
    pub old_name: Option<String>,
    /// Path in the newer (HEAD) tree.
    pub new_name: Option<String>,
}

impl TreeChange {
    pub fn added(path: impl Into<String>) -> Self {
        Self {
            old_name: None,
            new_name: Some(path.into()),
        }
    }

    pub fn removed(path: impl Into<String>) -> Self {
        Self {
            old_name: Some(path.into()),
            new_name: None,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            old_name: Some(path.clone()),
            new_name: Some(path),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match (&self.old_name, &self.new_name) {
            (None, _) => ChangeKind::Added,
            (_, None) => ChangeKind::Removed,
            _ => ChangeKind::Modified,
        }
    }

    /// Returns the most relevant path: the new name if present, else the old one.
    pub fn path(&self) -> &str {
        self.new_name
            .as_deref()
            .or(self.old_name.as_deref())
            .unwrap_or_default()
    }
}

/// An entry of `git ls-tree` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub object_type: String,
    pub object_id: String,
    pub path: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.object_type == "blob"
    }
}
