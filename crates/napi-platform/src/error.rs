use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("command `{cmd}` exited with {status}: {stderr}")]
    CommandStatus {
        cmd: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}
