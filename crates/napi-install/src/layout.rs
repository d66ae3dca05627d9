//! Where things live in a `node_modules` tree.

use std::fs;
use std::path::{Path, PathBuf};

use napi_manifest::{PACKAGE_JSON, PackageManifest};

pub const NODE_MODULES: &str = "node_modules";

/// Scratch directory used for the isolated install, inside the owning package.
pub const SCRATCH_DIR: &str = "npm-install";

/// Directory of the installed package `name`, searched the way the runtime
/// resolves modules: `node_modules/<name>` in `start` and each ancestor.
///
/// A `start` that is itself the package (postinstall scripts run there)
/// counts too.
pub fn find_package_dir(start: &Path, name: &str) -> Option<PathBuf> {
    if is_package(start, name) {
        return Some(start.to_path_buf());
    }
    start
        .ancestors()
        .map(|dir| dir.join(NODE_MODULES).join(name))
        .find(|dir| dir.join(PACKAGE_JSON).is_file())
}

fn is_package(dir: &Path, name: &str) -> bool {
    PackageManifest::from_path(&dir.join(PACKAGE_JSON)).is_ok_and(|manifest| manifest.name == name)
}

/// Resolve `<package>/<file>` from `start`, returning the first existing
/// `node_modules/<package>/<file>`.
pub fn resolve_module_file(start: &Path, package: &str, file: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(NODE_MODULES).join(package).join(file))
        .find(|path| path.is_file())
}

/// The `node_modules` directory that holds `package_dir`, one level up per
/// name segment so `@scope/name` climbs twice.
pub fn shared_node_modules(package_dir: &Path, name: &str) -> PathBuf {
    let depth = name.split('/').count();
    package_dir
        .ancestors()
        .nth(depth)
        .map_or_else(|| package_dir.to_path_buf(), Path::to_path_buf)
}

/// Where a recovered binary for `name` is written.
///
/// Without an installed package directory this falls back to
/// `<cwd>/node_modules/<name>/`, which is created.
pub fn binary_destination(
    package_dir: Option<&Path>,
    cwd: &Path,
    name: &str,
    file: &str,
) -> napi_fs::Result<PathBuf> {
    match package_dir {
        Some(dir) => Ok(dir.join(file_name(file))),
        None => {
            let dir = cwd.join(NODE_MODULES).join(name);
            napi_fs::ensure_dir(&dir)?;
            Ok(dir.join(file_name(file)))
        }
    }
}

fn file_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

/// Move every package in `from` into `to`, entry by entry for scoped
/// directories. Entries that cannot be moved (usually because they already
/// exist) are skipped.
pub fn merge_node_modules(from: &Path, to: &Path) -> napi_fs::Result<usize> {
    napi_fs::ensure_dir(to)?;
    let mut moved = 0;
    for entry in read_dir(from)? {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('@') {
            let scope = to.join(&name);
            napi_fs::ensure_dir(&scope)?;
            for nested in read_dir(&entry.path())? {
                moved += usize::from(try_move(&nested.path(), &scope.join(nested.file_name())));
            }
        } else {
            moved += usize::from(try_move(&entry.path(), &to.join(&name)));
        }
    }
    Ok(moved)
}

fn read_dir(dir: &Path) -> napi_fs::Result<Vec<fs::DirEntry>> {
    let read_error = |source| napi_fs::Error::Read {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(read_error)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_error)
}

fn try_move(from: &Path, to: &Path) -> bool {
    match napi_fs::relocate(from, to) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "skipping dependency that could not be moved");
            false
        }
    }
}
