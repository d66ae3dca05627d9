//! Package manager signals, read once per run.

use std::env;
use std::path::{Path, PathBuf};

pub const USER_AGENT_VAR: &str = "npm_config_user_agent";
pub const REGISTRY_VAR: &str = "npm_config_registry";
/// Stripped from the environment of isolated installs.
pub const GLOBAL_VAR: &str = "npm_config_global";

const PNP_MANIFESTS: [&str; 2] = [".pnp.cjs", ".pnp.js"];

/// What the invoking package manager told us about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub cwd: PathBuf,
    /// `npm_config_user_agent`, e.g. `pnpm/9.1.0 npm/? node/v20.11.0 linux x64`.
    pub user_agent: Option<String>,
    /// `npm_config_registry`
    pub registry: Option<String>,
}

impl Environment {
    pub fn from_process() -> std::io::Result<Self> {
        let var = |key: &str| env::var(key).ok().filter(|value: &String| !value.is_empty());
        Ok(Self {
            cwd: env::current_dir()?,
            user_agent: var(USER_AGENT_VAR),
            registry: var(REGISTRY_VAR),
        })
    }

    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Name of the invoking package manager, from the first user agent token.
    pub fn package_manager(&self) -> Option<&str> {
        let agent = self.user_agent.as_deref()?;
        agent
            .split_whitespace()
            .next()
            .and_then(|token| token.split('/').next())
            .filter(|name| !name.is_empty())
    }

    pub fn is_npm(&self) -> bool {
        self.user_agent
            .as_deref()
            .is_some_and(|agent| agent.starts_with("npm/"))
    }

    /// Yarn running with Plug'n'Play, where packages never land in
    /// `node_modules`.
    pub fn is_pnp(&self) -> bool {
        self.package_manager() == Some("yarn") && pnp_manifest(&self.cwd).is_some()
    }
}

/// The nearest `.pnp.cjs` or `.pnp.js` at or above `start`.
pub fn pnp_manifest(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        PNP_MANIFESTS
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}
