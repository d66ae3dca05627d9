//! Hand the whole job to the package manager's own executor.
//!
//! Used where this process cannot write into the dependency tree itself,
//! such as sandboxed containers: the executor runs a fresh copy of the tool
//! inside the package directory.

use std::path::Path;

use napi_manifest::{NativeAddonInfo, PackageManifest};

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::installer::checked_version;
use crate::package_manager::{Executor, PackageManager};
use crate::state::PatchStore;

/// Run `<executor> napi-postinstall <name> <version> <1|0>` for the package
/// whose manifest is at `package_json`.
///
/// Returns `false` when the package was already patched and nothing ran.
pub fn delegate(
    package_json: &Path,
    strict: bool,
    env: &Environment,
    package_manager: &impl PackageManager,
    store: &impl PatchStore,
) -> Result<bool> {
    let manifest = PackageManifest::from_path(package_json)?;
    let info = NativeAddonInfo::from_manifest(&manifest, strict)?;
    let version = checked_version(&manifest, &info, strict)?.ok_or_else(|| Error::MissingVersion {
        package: info.name.clone(),
    })?;

    if store.was_already_patched(&info.name) {
        tracing::debug!(package = %info.name, "already patched, not delegating");
        return Ok(false);
    }

    let executor = Executor::from_package_manager(env.package_manager())?;
    let dir = package_json
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(&env.cwd);
    let args = [
        info.name.clone(),
        version,
        if strict { "1" } else { "0" }.to_string(),
    ];
    tracing::info!(package = %info.name, %executor, "delegating to the package manager");
    package_manager.run_executor(executor, dir, &args)?;

    store.mark_patched(&info.name)?;
    Ok(true)
}
