//! Git output parsing helpers.

use super::types::{TreeChange, TreeEntry};
use crate::gitops::error::{GitOpsError, Result};

/// Parses `git diff-tree -r -z --name-status --no-renames` output.
///
/// The output is a NUL-separated sequence of `status, path` pairs.
pub fn parse_diff_tree(output: &[u8]) -> Result<Vec<TreeChange>> {
    let text = String::from_utf8_lossy(output);
    let mut fields = text.split('\0').filter(|f| !f.is_empty());
    let mut changes = Vec::new();

    while let Some(status) = fields.next() {
        let path = fields.next().ok_or_else(|| {
            GitOpsError::UnexpectedOutput(format!("diff-tree status '{}' without a path", status))
        })?;

        // Only the first letter matters; scores are not emitted without renames
        let change = match status.chars().next() {
            Some('A') => TreeChange::added(path),
            Some('D') => TreeChange::removed(path),
            Some('M') | Some('T') => TreeChange::modified(path),
            _ => {
                return Err(GitOpsError::UnexpectedOutput(format!(
                    "unknown diff-tree status '{}' for '{}'",
                    status, path
                )))
            }
        };
        changes.push(change);
    }

    Ok(changes)
}

/// Parses `git ls-tree -z` output (`<mode> <type> <oid>\t<path>\0`).
pub fn parse_ls_tree(output: &[u8]) -> Result<Vec<TreeEntry>> {
    let text = String::from_utf8_lossy(output);
    let mut entries = Vec::new();

    for record in text.split('\0').filter(|r| !r.is_empty()) {
        let (meta, path) = record
            .split_once('\t')
            .ok_or_else(|| GitOpsError::UnexpectedOutput(format!("ls-tree record '{}'", record)))?;

        let mut parts = meta.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(mode), Some(object_type), Some(object_id)) => entries.push(TreeEntry {
                mode: mode.to_string(),
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
                path: path.to_string(),
            }),
            _ => {
                return Err(GitOpsError::UnexpectedOutput(format!(
                    "ls-tree record '{}'",
                    record
                )))
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitops::git::types::ChangeKind;

    #[test]
    fn test_parse_diff_tree() {
        let output = b"M\0apps/main.yaml\0A\0apps/new.yaml\0D\0apps/old.yaml\0";
        let changes = parse_diff_tree(output).unwrap();

        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], TreeChange::modified("apps/main.yaml"));
        assert_eq!(changes[1].kind(), ChangeKind::Added);
        assert_eq!(changes[1].path(), "apps/new.yaml");
        assert_eq!(changes[2].kind(), ChangeKind::Removed);
        assert_eq!(changes[2].old_name.as_deref(), Some("apps/old.yaml"));
        assert!(changes[2].new_name.is_none());
    }

    #[test]
    fn test_parse_diff_tree_keeps_spaces_in_paths() {
        let changes = parse_diff_tree(b"M\0apps/with space.yaml\0").unwrap();
        assert_eq!(changes[0].path(), "apps/with space.yaml");
    }

    #[test]
    fn test_parse_diff_tree_empty() {
        assert!(parse_diff_tree(b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_diff_tree_truncated() {
        assert!(parse_diff_tree(b"M\0").is_err());
    }

    #[test]
    fn test_parse_ls_tree() {
        let output =
            b"100644 blob 3b18e512dba79e4c8300dd08aeb37f8e728b8dad\tapps/main.yaml\0";
        let entries = parse_ls_tree(output).unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_blob());
        assert_eq!(entries[0].mode, "100644");
        assert_eq!(
            entries[0].object_id,
            "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
        );
        assert_eq!(entries[0].path, "apps/main.yaml");
    }

    #[test]
    fn test_parse_ls_tree_tree_entry() {
        let output = b"040000 tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\tapps\0";
        let entries = parse_ls_tree(output).unwrap();
        assert!(!entries[0].is_blob());
    }
}
