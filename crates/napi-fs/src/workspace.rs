use std::path::{Path, PathBuf};

use crate::Result;
use crate::primitives::{FileMode, ensure_dir, remove_tree, write_file};

/// A scratch directory that is removed when dropped.
///
/// `close` performs the removal eagerly and hands back its result so the
/// caller can log it; dropping swallows the result after a debug line.
pub struct Workspace {
    root: PathBuf,
    closed: bool,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self {
            root,
            closed: false,
        })
    }

    pub fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            ensure_dir(parent)?;
        }
        write_file(&full_path, content, FileMode::Regular)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        remove_tree(&self.root)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            tracing::debug!(
                path = %self.root.display(),
                error = %e,
                "leaving scratch directory behind"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_write() -> Result<()> {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("npm-install"))?;
        workspace.write(Path::new("package.json"), b"{}")?;
        assert_eq!(
            std::fs::read(dir.path().join("npm-install/package.json")).unwrap(),
            b"{}"
        );
        Ok(())
    }

    #[test]
    fn test_workspace_close_removes_tree() -> Result<()> {
        let dir = tempdir().unwrap();
        let root = dir.path().join("scratch");
        let workspace = Workspace::new(&root)?;
        workspace.write(Path::new("a/b.txt"), b"data")?;
        workspace.close()?;
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn test_workspace_cleanup_on_drop() -> Result<()> {
        let dir = tempdir().unwrap();
        let root = dir.path().join("staging");
        let workspace = Workspace::new(&root)?;
        workspace.write(Path::new("file.txt"), b"data")?;
        assert!(root.exists());
        drop(workspace);
        assert!(!root.exists());
        Ok(())
    }
}
