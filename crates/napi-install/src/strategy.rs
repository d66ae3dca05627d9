//! The recovery chain for a declared sub-package that is missing on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use napi_fetch::{HttpClient, Registry};
use napi_fs::{FileMode, Workspace};
use napi_manifest::PACKAGE_JSON;
use napi_platform::WASM32_WASI;

use crate::layout::{NODE_MODULES, SCRATCH_DIR, merge_node_modules, shared_node_modules};
use crate::package_manager::PackageManager;

/// One way of getting a missing binary onto disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Nested `npm install` in a scratch directory, then move the result.
    IsolatedInstall,
    /// Fetch the tarball from the registry and extract the one file.
    DirectDownload,
}

impl Strategy {
    /// The order strategies are tried in.
    pub const CHAIN: [Strategy; 2] = [Self::IsolatedInstall, Self::DirectDownload];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IsolatedInstall => "isolated install",
            Self::DirectDownload => "direct download",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The binary now exists at this path.
    Success(PathBuf),
    /// This strategy failed; the next one may still work.
    Recoverable(String),
    /// Nothing later in the chain can succeed either.
    Fatal(String),
}

/// Everything a strategy needs to know about the sub-package it recovers.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The owning package.
    pub owner: String,
    /// The per-target sub-package.
    pub package: String,
    pub version: String,
    /// `platform-arch[-abi]` key.
    pub target: String,
    /// Binary file name inside the sub-package.
    pub binary_file: String,
    /// Installed directory of the owning package, when there is one.
    pub package_dir: Option<PathBuf>,
    /// Where a single recovered binary is written.
    pub destination: PathBuf,
}

impl Candidate {
    pub fn spec(&self) -> String {
        format!("{}@{}", self.package, self.version)
    }

    pub fn is_portable(&self) -> bool {
        self.target == WASM32_WASI
    }
}

pub fn isolated_install(
    candidate: &Candidate,
    package_manager: &impl PackageManager,
) -> StrategyOutcome {
    let Some(package_dir) = candidate.package_dir.as_deref() else {
        return StrategyOutcome::Recoverable(format!(
            "`{}` is not installed in a `{NODE_MODULES}` directory",
            candidate.owner
        ));
    };

    let workspace = match Workspace::new(package_dir.join(SCRATCH_DIR)) {
        Ok(workspace) => workspace,
        Err(napi_fs::Error::ReadOnly { path }) => {
            tracing::error!(
                path = %path.display(),
                "Failed to create the temporary directory on read-only location"
            );
            tracing::error!("You have to install `{}` manually in this case.", candidate.package);
            return StrategyOutcome::Recoverable(format!(
                "{} is read-only, install `{}` manually",
                path.display(),
                candidate.package
            ));
        }
        Err(err) => return StrategyOutcome::Recoverable(err.to_string()),
    };

    let outcome = install_into(&workspace, candidate, package_dir, package_manager);

    if let Err(err) = workspace.close() {
        tracing::debug!(error = %err, "leaving scratch directory behind");
    }
    outcome
}

fn install_into(
    workspace: &Workspace,
    candidate: &Candidate,
    package_dir: &Path,
    package_manager: &impl PackageManager,
) -> StrategyOutcome {
    if let Err(err) = workspace.write(Path::new(PACKAGE_JSON), b"{}") {
        return StrategyOutcome::Recoverable(err.to_string());
    }
    let spec = candidate.spec();
    let installed =
        package_manager.install_isolated(workspace.path(), &spec, candidate.is_portable());
    if let Err(err) = installed {
        return StrategyOutcome::Recoverable(err.to_string());
    }

    let installed = workspace.path().join(NODE_MODULES);
    let source = installed.join(&candidate.package);

    if candidate.is_portable() {
        // the portable build needs its runtime dependencies next to it
        let target = package_dir.join(NODE_MODULES);
        match merge_node_modules(&installed, &target) {
            Ok(moved) => {
                tracing::debug!(moved, into = %target.display(), "merged scratch node_modules")
            }
            Err(err) => tracing::debug!(error = %err, "could not merge scratch node_modules"),
        }
        let binary = target.join(&candidate.package).join(&candidate.binary_file);
        if binary.is_file() {
            return StrategyOutcome::Success(binary);
        }
        return move_binary(&source, candidate);
    }

    let shared = shared_node_modules(package_dir, &candidate.owner).join(&candidate.package);
    let moved = napi_fs::ensure_dir(&shared).and_then(|()| napi_fs::relocate(&source, &shared));
    match moved {
        Ok(()) => StrategyOutcome::Success(shared.join(&candidate.binary_file)),
        Err(err) => {
            tracing::debug!(
                error = %err,
                "could not move the package directory, moving the binary alone"
            );
            move_binary(&source, candidate)
        }
    }
}

fn move_binary(source: &Path, candidate: &Candidate) -> StrategyOutcome {
    let binary = source.join(&candidate.binary_file);
    match napi_fs::relocate(&binary, &candidate.destination) {
        Ok(()) => StrategyOutcome::Success(candidate.destination.clone()),
        Err(err) => StrategyOutcome::Recoverable(err.to_string()),
    }
}

pub async fn direct_download(
    candidate: &Candidate,
    client: &impl HttpClient,
    registry: &Registry,
    redirect_limit: usize,
) -> StrategyOutcome {
    let url = registry.tarball_url(&candidate.package, &candidate.version);
    tracing::info!("Trying to download {url:?}");

    let archive = match napi_fetch::fetch(client, &url, redirect_limit).await {
        Ok(archive) => archive,
        Err(err) => return download_failed(&url, err.to_string()),
    };
    let binary = match napi_archive::extract_file(&archive, &candidate.binary_file) {
        Ok(binary) => binary,
        Err(err) => return download_failed(&url, err.to_string()),
    };

    let mode = FileMode::for_binary(&candidate.destination);
    match napi_fs::write_file(&candidate.destination, &binary, mode) {
        Ok(()) => StrategyOutcome::Success(candidate.destination.clone()),
        Err(err) => StrategyOutcome::Fatal(err.to_string()),
    }
}

fn download_failed(url: &str, reason: String) -> StrategyOutcome {
    tracing::warn!("Failed to download {url:?}: {reason}");
    StrategyOutcome::Recoverable(reason)
}
