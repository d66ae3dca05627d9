use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to move '{}' to '{}': {source}", from.display(), to.display())]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove '{}': {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("location '{}' is read-only", path.display())]
    ReadOnly { path: PathBuf },
}

impl Error {
    /// The underlying I/O error, when there is one.
    pub fn io(&self) -> Option<&std::io::Error> {
        match self {
            Self::Write { source, .. }
            | Self::Read { source, .. }
            | Self::Relocate { source, .. }
            | Self::CreateDir { source, .. }
            | Self::Remove { source, .. } => Some(source),
            Self::ReadOnly { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Whether an I/O error means the location cannot be written at all:
/// a read-only mount (`EROFS`) or missing write permission (`EACCES`).
pub(crate) fn is_read_only(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ReadOnlyFilesystem | std::io::ErrorKind::PermissionDenied
    )
}

#[cfg(test)]
mod tests {
    use std::io::{Error as IoError, ErrorKind};

    use super::*;

    #[test]
    fn test_read_only_kinds() {
        assert!(is_read_only(&IoError::from(ErrorKind::ReadOnlyFilesystem)));
        assert!(is_read_only(&IoError::from(ErrorKind::PermissionDenied)));
        assert!(!is_read_only(&IoError::from(ErrorKind::NotFound)));
        assert!(!is_read_only(&IoError::other("disk on fire")));
    }
}
