#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not find `{path}` in archive")]
    NotFound { path: String },

    #[error("archive is corrupted: {reason}")]
    Corrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
