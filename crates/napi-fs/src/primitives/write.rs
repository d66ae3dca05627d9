//! Whole-file writes that never expose a partial file at the destination.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Permission bits a written file ends up with on Unix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    /// `0o644`
    Regular,
    /// `0o755`
    Executable,
}

impl FileMode {
    /// `.node` addons are shared objects and are made executable like the
    /// copies npm unpacks; `.wasm` and anything else is plain data.
    pub fn for_binary(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("node") => Self::Executable,
            _ => Self::Regular,
        }
    }

    #[cfg(unix)]
    fn bits(self) -> u32 {
        match self {
            Self::Regular => 0o644,
            Self::Executable => 0o755,
        }
    }
}

/// Write `content` into a temporary sibling of `path`, flush it, then rename
/// it over `path`. The parent directory must exist.
pub fn write_file(path: impl AsRef<Path>, content: &[u8], mode: FileMode) -> Result<()> {
    let path = path.as_ref();
    let failed = |source: io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut staged = NamedTempFile::new_in(parent).map_err(failed)?;
    staged.write_all(content).map_err(failed)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(mode.bits()))
            .map_err(failed)?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    staged.as_file().sync_all().map_err(failed)?;

    // a failed persist drops the staged file, which deletes it
    staged.persist(path).map_err(|err| failed(err.error))?;
    tracing::trace!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acme.linux-x64-gnu.node");
        write_file(&path, b"\x7fELF", FileMode::Executable).unwrap();
        assert_eq!(read_file(&path).unwrap(), b"\x7fELF");
    }

    #[test]
    fn test_write_file_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patched.json");
        fs::write(&path, "old").unwrap();
        write_file(&path, b"new", FileMode::Regular).unwrap();
        assert_eq!(read_file(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_file_leaves_no_staged_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acme.wasm32-wasi.wasm");
        write_file(&path, b"\0asm", FileMode::Regular).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, [std::ffi::OsString::from("acme.wasm32-wasi.wasm")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_sets_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let addon = dir.path().join("acme.linux-x64-gnu.node");
        let state = dir.path().join("patched.json");
        write_file(&addon, b"bin", FileMode::Executable).unwrap();
        write_file(&state, b"{}", FileMode::Regular).unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&addon), 0o755);
        assert_eq!(mode(&state), 0o644);
    }

    #[test]
    fn test_write_file_missing_parent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("acme.node");
        let err = write_file(&path, b"data", FileMode::Executable).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_mode_for_binary() {
        assert_eq!(
            FileMode::for_binary(Path::new("acme.linux-x64-gnu.node")),
            FileMode::Executable
        );
        assert_eq!(
            FileMode::for_binary(Path::new("acme.wasm32-wasi.wasm")),
            FileMode::Regular
        );
        assert_eq!(FileMode::for_binary(Path::new("acme")), FileMode::Regular);
    }
}
