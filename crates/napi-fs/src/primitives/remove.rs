use std::path::Path;

use crate::{Error, Result};

/// Remove a directory tree, skipping entries that vanish underneath us.
///
/// Callers treat the result as advisory: a failure here never outranks the
/// operation that created the directory.
pub fn remove_tree(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remove_tree() {
        let dir = tempdir().unwrap();
        let tree = dir.path().join("npm-install/node_modules/pkg");
        std::fs::create_dir_all(&tree).unwrap();
        std::fs::write(tree.join("index.node"), "x").unwrap();

        remove_tree(dir.path().join("npm-install")).unwrap();
        assert!(!dir.path().join("npm-install").exists());
    }

    #[test]
    fn test_remove_tree_missing_is_ok() {
        let dir = tempdir().unwrap();
        assert!(remove_tree(dir.path().join("nope")).is_ok());
    }
}
