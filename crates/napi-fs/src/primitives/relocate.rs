use std::fs;
use std::io;
use std::path::Path;

use crate::error::is_read_only;
use crate::{Error, Result};

#[cfg(windows)]
const RENAME_ATTEMPTS: u32 = 5;
#[cfg(windows)]
const RENAME_BACKOFF: std::time::Duration = std::time::Duration::from_millis(100);

/// Rename `src` to `dest`.
///
/// On Unix a directory may replace an empty directory; a populated destination fails.
/// Windows retries sharing violations with a growing delay before giving up.
pub fn relocate(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    rename(src, dest).map_err(|source| Error::Relocate {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })
}

#[cfg(not(windows))]
fn rename(src: &Path, dest: &Path) -> io::Result<()> {
    fs::rename(src, dest)
}

#[cfg(windows)]
fn rename(src: &Path, dest: &Path) -> io::Result<()> {
    let mut attempt = 1;
    loop {
        match fs::rename(src, dest) {
            Err(err)
                if err.kind() == io::ErrorKind::PermissionDenied && attempt < RENAME_ATTEMPTS =>
            {
                std::thread::sleep(RENAME_BACKOFF * attempt);
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Create `path` and its parents, reporting read-only locations distinctly.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|source| {
        if is_read_only(&source) {
            Error::ReadOnly {
                path: path.to_path_buf(),
            }
        } else {
            Error::CreateDir {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_relocate_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.node");
        let dest = dir.path().join("b.node");
        std::fs::write(&src, "bin").unwrap();

        relocate(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"bin");
    }

    #[cfg(unix)]
    #[test]
    fn test_relocate_dir_over_empty_dir() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("file.txt"), "data").unwrap();

        relocate(&src, &dest).unwrap();
        assert!(dest.join("file.txt").exists());
    }

    #[test]
    fn test_relocate_dir_over_populated_dir_fails() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("file.txt"), "data").unwrap();
        std::fs::write(dest.join("other.txt"), "data").unwrap();

        let err = relocate(&src, &dest).unwrap_err();
        assert!(matches!(err, Error::Relocate { .. }));
        assert!(src.join("file.txt").exists());
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
