use std::collections::BTreeMap;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::error::{CompareError, Result};

/// Relative path (`/`-separated) to hex SHA-256 of the file content.
pub type TreeHashes = BTreeMap<String, String>;

/// Hashes every regular file below `root`.
///
/// A missing `root` yields an empty map, which is how an unrendered side
/// of a new application looks.
pub fn hash_tree(root: &Path) -> Result<TreeHashes> {
    let mut hashes = TreeHashes::new();
    if !root.exists() {
        return Ok(hashes);
    }

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| CompareError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let content = std::fs::read(path).map_err(|e| CompareError::io(path, e))?;
        hashes.insert(key, hex::encode(Sha256::digest(&content)));
    }

    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_tree_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("web/templates")).unwrap();
        std::fs::write(dir.path().join("web/templates/cm.yaml"), "a").unwrap();
        std::fs::write(dir.path().join("top.yaml"), "b").unwrap();

        let hashes = hash_tree(dir.path()).unwrap();
        let keys: Vec<&str> = hashes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["top.yaml", "web/templates/cm.yaml"]);
        assert_eq!(
            hashes["top.yaml"],
            "3e23e8160039594a33894f6564e1b1348bbd7a0088d42c4acb73eeaed59c009d"
        );
    }

    #[test]
    fn test_hash_tree_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(hash_tree(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_same_content_same_hash() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "same").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "same").unwrap();

        let hashes = hash_tree(dir.path()).unwrap();
        assert_eq!(hashes["a.yaml"], hashes["b.yaml"]);
    }
}
