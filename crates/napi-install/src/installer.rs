//! Finds the host's native addon and runs the recovery chain when it is
//! missing.

use std::path::{Path, PathBuf};

use napi_fetch::{DEFAULT_REDIRECT_LIMIT, HttpClient, Registry};
use napi_manifest::{NativeAddonInfo, PACKAGE_JSON, PackageManifest};

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::layout::{binary_destination, find_package_dir, resolve_module_file};
use crate::package_manager::PackageManager;
use crate::state::PatchStore;
use crate::strategy::{Candidate, Strategy, StrategyOutcome, direct_download, isolated_install};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The sub-package binary was already installed.
    Present { package: String, path: PathBuf },
    /// A previous run already put the binary in place.
    AlreadyPatched { package: String },
    /// A recovery strategy placed the binary.
    Recovered {
        package: String,
        strategy: Strategy,
        path: PathBuf,
    },
    /// Yarn Plug'n'Play manages the package; nothing was written.
    Deferred { package: String },
    /// No sub-package is declared for any target this host accepts.
    NothingDeclared,
}

pub struct Installer<C, P, S> {
    env: Environment,
    targets: Vec<String>,
    registry: Registry,
    client: C,
    package_manager: P,
    store: S,
    redirect_limit: usize,
    strategies: Vec<Strategy>,
}

impl<C: HttpClient, P: PackageManager, S: PatchStore> Installer<C, P, S> {
    /// `targets` are the host's acceptable keys, best first.
    pub fn new(
        env: Environment,
        targets: Vec<String>,
        registry: Registry,
        client: C,
        package_manager: P,
        store: S,
    ) -> Self {
        Self {
            env,
            targets,
            registry,
            client,
            package_manager,
            store,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            strategies: Strategy::CHAIN.to_vec(),
        }
    }

    pub fn redirect_limit(mut self, limit: usize) -> Self {
        self.redirect_limit = limit;
        self
    }

    pub fn strategies(mut self, strategies: impl Into<Vec<Strategy>>) -> Self {
        self.strategies = strategies.into();
        self
    }

    /// Load the manifest of `name` and make sure its binary is in place.
    pub async fn check_and_prepare_package(
        &self,
        name: &str,
        version: Option<&str>,
        strict: bool,
    ) -> Result<Outcome> {
        let manifest = self.load_manifest(name, version).await?;
        self.check_and_prepare(&manifest, strict).await
    }

    /// Make sure the binary of the package described by `manifest` is in place.
    pub async fn check_and_prepare(
        &self,
        manifest: &PackageManifest,
        strict: bool,
    ) -> Result<Outcome> {
        let info = NativeAddonInfo::from_manifest(manifest, strict)?;
        let version = checked_version(manifest, &info, strict)?;

        let package_dir = find_package_dir(&self.env.cwd, &info.name);
        let search_from = package_dir.as_deref().unwrap_or(&self.env.cwd);

        for target in &self.targets {
            let package = info.sub_package(target);
            if info.declared_version(&package).is_none() {
                tracing::debug!(package = %package, "not declared, skipping");
                continue;
            }

            let binary_file = info.binary_file(target);
            if let Some(path) = resolve_module_file(search_from, &package, &binary_file) {
                tracing::debug!(path = %path.display(), "binary present");
                return Ok(Outcome::Present { package, path });
            }
            if self.is_patched(&info.name, package_dir.as_deref(), &binary_file) {
                tracing::debug!(package = %info.name, "already patched");
                return Ok(Outcome::AlreadyPatched { package: info.name });
            }

            let version = version.clone().ok_or_else(|| Error::MissingVersion {
                package: info.name.clone(),
            })?;

            if self.env.is_pnp() {
                self.defer_to_pnp(&package, &version, target);
                return Ok(Outcome::Deferred { package });
            }
            if !self.env.is_npm() {
                tracing::warn!("{}", no_optional_warning(&package, &info.name));
            }

            let destination = binary_destination(
                package_dir.as_deref(),
                &self.env.cwd,
                &info.name,
                &binary_file,
            )?;
            let candidate = Candidate {
                owner: info.name.clone(),
                package,
                version,
                target: target.clone(),
                binary_file,
                package_dir: package_dir.clone(),
                destination,
            };
            return self.recover(&candidate).await;
        }

        tracing::debug!(
            package = %info.name,
            targets = ?self.targets,
            "no sub-package declared for this host"
        );
        Ok(Outcome::NothingDeclared)
    }

    /// A previous recovery left the binary next to the owning package.
    /// The patch store is not consulted: only a file on disk counts.
    fn is_patched(&self, owner: &str, package_dir: Option<&Path>, binary_file: &str) -> bool {
        package_dir.is_some_and(|dir| dir.join(binary_file).is_file())
            || resolve_module_file(&self.env.cwd, owner, binary_file).is_some()
    }

    fn defer_to_pnp(&self, package: &str, version: &str, target: &str) {
        if target != napi_platform::WASM32_WASI {
            return;
        }
        let spec = format!("{package}@{version}");
        if let Err(err) = self.package_manager.add_dev_dependency(&self.env.cwd, &spec) {
            tracing::error!(
                "Failed to install package `{package}` automatically in the yarn P'n'P environment: {err}"
            );
            tracing::error!("You'll have to install it manually in this case.");
        }
    }

    async fn recover(&self, candidate: &Candidate) -> Result<Outcome> {
        let mut causes = Vec::new();

        for &strategy in &self.strategies {
            tracing::info!(
                package = %candidate.package,
                %strategy,
                "Trying to install package \"{}\"",
                candidate.package
            );
            let outcome = match strategy {
                Strategy::IsolatedInstall => isolated_install(candidate, &self.package_manager),
                Strategy::DirectDownload => {
                    let limit = self.redirect_limit;
                    direct_download(candidate, &self.client, &self.registry, limit).await
                }
            };

            match outcome {
                StrategyOutcome::Success(path) => {
                    tracing::info!(
                        package = %candidate.package,
                        path = %path.display(),
                        "installed"
                    );
                    if let Err(err) = self.store.mark_patched(&candidate.owner) {
                        tracing::warn!(
                            package = %candidate.owner,
                            error = %err,
                            "could not record patch state"
                        );
                    }
                    return Ok(Outcome::Recovered {
                        package: candidate.package.clone(),
                        strategy,
                        path,
                    });
                }
                StrategyOutcome::Recoverable(reason) => {
                    tracing::warn!(
                        package = %candidate.package,
                        %strategy,
                        "Failed to install package: {reason}"
                    );
                    causes.push(format!("{strategy}: {reason}"));
                }
                StrategyOutcome::Fatal(reason) => {
                    tracing::warn!(
                        package = %candidate.package,
                        %strategy,
                        "Failed to install package: {reason}"
                    );
                    causes.push(format!("{strategy}: {reason}"));
                    break;
                }
            }
        }

        Err(Error::RecoveryExhausted {
            package: candidate.package.clone(),
            causes,
        })
    }

    /// Find the manifest of `name`: the working directory when it is that
    /// exact package, then an installed copy, then the registry.
    pub async fn load_manifest(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<PackageManifest> {
        if let Some(manifest) = read_cwd_manifest(&self.env.cwd, name, version) {
            return Ok(manifest);
        }
        if let Some(dir) = find_package_dir(&self.env.cwd, name) {
            match PackageManifest::from_path(&dir.join(PACKAGE_JSON)) {
                Ok(manifest) => return Ok(manifest),
                Err(err) => tracing::debug!(error = %err, "installed manifest unusable"),
            }
        }

        let version = version.ok_or_else(|| Error::MissingVersion {
            package: name.to_string(),
        })?;
        let url = self.registry.manifest_url(name, version);
        tracing::debug!(url = %url, "loading manifest from the registry");
        let body = napi_fetch::fetch(&self.client, &url, self.redirect_limit).await?;
        Ok(PackageManifest::from_slice(&body)?)
    }
}

fn read_cwd_manifest(cwd: &Path, name: &str, version: Option<&str>) -> Option<PackageManifest> {
    let manifest = PackageManifest::from_path(&cwd.join(PACKAGE_JSON)).ok()?;
    let matches =
        manifest.name == name && version.is_some() && manifest.version.as_deref() == version;
    matches.then_some(manifest)
}

/// The version to request for sub-packages, after the strict owner check.
pub(crate) fn checked_version(
    manifest: &PackageManifest,
    info: &NativeAddonInfo,
    strict: bool,
) -> Result<Option<String>> {
    let version = info.resolved_version().map(str::to_string);
    if strict && manifest.version != version {
        return Err(Error::VersionMismatch {
            package: info.name.clone(),
            package_version: manifest.version.clone().unwrap_or_else(|| "undefined".to_string()),
            package_name: info.package_name.clone(),
            native_version: version.unwrap_or_else(|| "undefined".to_string()),
        });
    }
    Ok(version)
}

fn no_optional_warning(package: &str, owner: &str) -> String {
    format!(
        "Failed to find package \"{package}\" on the file system\n\n\
         This can happen if you use the \"--no-optional\" flag. The \"optionalDependencies\"\n\
         {PACKAGE_JSON} feature is used by {owner} to install the correct napi binary\n\
         for your current platform. This install script will now attempt to work around\n\
         this. If that fails, you need to remove the \"--no-optional\" flag to use {owner}.\n"
    )
}
