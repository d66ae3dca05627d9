//! Error types for napi-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Server responded with {status}")]
    Status { url: String, status: u16 },

    #[error("redirect loop detected (more than {limit} redirects) starting at {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("invalid redirect location `{location}` from {url}")]
    InvalidRedirect { url: String, location: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
