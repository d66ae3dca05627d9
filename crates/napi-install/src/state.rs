//! Which packages a previous run already patched.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::NODE_MODULES;

pub trait PatchStore {
    fn was_already_patched(&self, package: &str) -> bool;
    fn mark_patched(&self, package: &str) -> Result<()>;
}

impl<T: PatchStore + ?Sized> PatchStore for &T {
    fn was_already_patched(&self, package: &str) -> bool {
        (**self).was_already_patched(package)
    }

    fn mark_patched(&self, package: &str) -> Result<()> {
        (**self).mark_patched(package)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PatchState {
    #[serde(default)]
    patched: BTreeSet<String>,
}

/// Patch state persisted as JSON, rewritten atomically on every mark.
#[derive(Debug, Clone)]
pub struct FilePatchStore {
    path: PathBuf,
}

impl FilePatchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<root>/node_modules/.cache/napi-postinstall/patched.json`
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(NODE_MODULES)
            .join(".cache")
            .join("napi-postinstall")
            .join("patched.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<PatchState> {
        let bytes = match napi_fs::read_file(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.io().is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) => {
                return Ok(PatchState::default());
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| Error::State {
            path: self.path.clone(),
            source,
        })
    }
}

impl PatchStore for FilePatchStore {
    fn was_already_patched(&self, package: &str) -> bool {
        match self.load() {
            Ok(state) => state.patched.contains(package),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable patch state"
                );
                false
            }
        }
    }

    fn mark_patched(&self, package: &str) -> Result<()> {
        let mut state = self.load().unwrap_or_default();
        if !state.patched.insert(package.to_string()) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            napi_fs::ensure_dir(parent)?;
        }
        let json = serde_json::to_vec_pretty(&state).map_err(|source| Error::State {
            path: self.path.clone(),
            source,
        })?;
        napi_fs::write_file(&self.path, &json, napi_fs::FileMode::Regular)?;
        tracing::debug!(package, path = %self.path.display(), "marked patched");
        Ok(())
    }
}

/// Patch state that lives for the current process only.
#[derive(Debug, Default)]
pub struct MemoryPatchStore {
    patched: Mutex<BTreeSet<String>>,
}

impl MemoryPatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatchStore for MemoryPatchStore {
    fn was_already_patched(&self, package: &str) -> bool {
        self.patched
            .lock()
            .map(|patched| patched.contains(package))
            .unwrap_or(false)
    }

    fn mark_patched(&self, package: &str) -> Result<()> {
        if let Ok(mut patched) = self.patched.lock() {
            patched.insert(package.to_string());
        }
        Ok(())
    }
}
