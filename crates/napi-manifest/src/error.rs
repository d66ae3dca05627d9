use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "No `napi.targets` nor `napi.triples.additional` field found in `{package}`'s `package.json`. Please ensure the package is built with NAPI support."
    )]
    Configuration { package: String },

    #[error(
        "Inconsistent package versions found for `{package}` with `{sub_package}` v{found} vs v{expected}."
    )]
    VersionMismatch {
        package: String,
        sub_package: String,
        found: String,
        expected: String,
    },

    #[error("invalid package.json: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
