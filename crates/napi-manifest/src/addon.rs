use std::collections::BTreeMap;

use napi_platform::{Target, WASM32_WASI};

use crate::error::{Error, Result};
use crate::manifest::PackageManifest;

/// Native addon metadata with every legacy field folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAddonInfo {
    /// The owning package.
    pub name: String,
    /// The owning package's own version, if the manifest has one.
    pub package_version: Option<String>,
    /// File name stem of the compiled addon.
    pub binary_name: String,
    /// Prefix of every per-target sub-package.
    pub package_name: String,
    /// Declared triples, in declaration order.
    pub targets: Vec<String>,
    /// Version taken from the first declared sub-package, if any.
    pub native_version: Option<String>,
    optional_dependencies: BTreeMap<String, String>,
}

impl NativeAddonInfo {
    /// Read the native addon metadata out of `manifest`.
    ///
    /// With `strict` set, every declared sub-package must carry the same
    /// version; otherwise the first declared one wins.
    pub fn from_manifest(manifest: &PackageManifest, strict: bool) -> Result<Self> {
        let napi = manifest.napi.clone().unwrap_or_default();
        let targets = napi
            .targets
            .or_else(|| napi.triples.and_then(|triples| triples.additional))
            .filter(|targets| !targets.is_empty())
            .ok_or_else(|| Error::Configuration {
                package: manifest.name.clone(),
            })?;

        let binary_name = napi
            .binary_name
            .or(napi.name)
            .unwrap_or_else(|| default_binary_name(&manifest.name).to_string());
        let package_name = napi
            .package_name
            .or_else(|| napi.package.and_then(|package| package.name))
            .unwrap_or_else(|| manifest.name.clone());

        let mut info = Self {
            name: manifest.name.clone(),
            package_version: manifest.version.clone(),
            binary_name,
            package_name,
            targets,
            native_version: None,
            optional_dependencies: manifest.optional_dependencies.clone().unwrap_or_default(),
        };
        if manifest.optional_dependencies.is_some() {
            info.native_version = info.resolve_native_version(strict)?;
        }
        tracing::debug!(
            package = %info.name,
            package_name = %info.package_name,
            targets = info.targets.len(),
            native_version = ?info.native_version,
            "read native addon metadata"
        );
        Ok(info)
    }

    fn resolve_native_version(&self, strict: bool) -> Result<Option<String>> {
        let mut version: Option<&str> = None;
        for target in &self.targets {
            let sub_package = self.sub_package(&Target::parse(target).platform_arch_abi);
            let Some(declared) = self.declared_version(&sub_package) else {
                continue;
            };
            match version {
                Some(expected) => {
                    if strict && expected != declared {
                        return Err(Error::VersionMismatch {
                            package: self.name.clone(),
                            sub_package,
                            found: declared.to_string(),
                            expected: expected.to_string(),
                        });
                    }
                }
                None => {
                    version = Some(declared);
                    if !strict {
                        break;
                    }
                }
            }
        }
        Ok(version.map(str::to_string))
    }

    /// The version to request for sub-packages.
    pub fn resolved_version(&self) -> Option<&str> {
        self.native_version
            .as_deref()
            .or(self.package_version.as_deref())
    }

    /// `<packageName>-<platformArchABI>`
    pub fn sub_package(&self, target: &str) -> String {
        format!("{}-{target}", self.package_name)
    }

    /// Version the owning package declares for `sub_package`.
    pub fn declared_version(&self, sub_package: &str) -> Option<&str> {
        self.optional_dependencies
            .get(sub_package)
            .map(String::as_str)
            .filter(|version| !version.is_empty())
    }

    /// File name of the addon built for `target`.
    pub fn binary_file(&self, target: &str) -> String {
        let extension = if target == WASM32_WASI { "wasm" } else { "node" };
        format!("{}.{target}.{extension}", self.binary_name)
    }
}

/// A scoped name keeps only its last segment so the file name stays flat.
fn default_binary_name(package: &str) -> &str {
    package.rsplit('/').next().unwrap_or(package)
}

/// Convenience wrapper over [`NativeAddonInfo::from_manifest`].
pub fn extract_native_addon_info(
    manifest: &PackageManifest,
    strict: bool,
) -> Result<NativeAddonInfo> {
    NativeAddonInfo::from_manifest(manifest, strict)
}
