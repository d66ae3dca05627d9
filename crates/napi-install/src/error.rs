use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] napi_manifest::Error),

    #[error(transparent)]
    Fetch(#[from] napi_fetch::Error),

    #[error(transparent)]
    Fs(#[from] napi_fs::Error),

    #[error(transparent)]
    Command(#[from] napi_platform::Error),

    #[error(
        "Inconsistent package versions found for `{package}` v{package_version} vs `{package_name}` v{native_version}."
    )]
    VersionMismatch {
        package: String,
        package_version: String,
        package_name: String,
        native_version: String,
    },

    #[error("Failed to load `package.json` from `{package}`, please provide a version.")]
    MissingVersion { package: String },

    #[error(
        "Unsupported package manager: {agent}. Supported managers are: {}.",
        supported.join(", ")
    )]
    UnsupportedPackageManager {
        agent: String,
        supported: Vec<&'static str>,
    },

    #[error("Failed to install package \"{package}\": {}", causes.join("; "))]
    RecoveryExhausted { package: String, causes: Vec<String> },

    #[error("invalid patch state in {}: {source}", path.display())]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
