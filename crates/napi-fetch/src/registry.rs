//! Registry base URL discovery and the URLs derived from it.

use napi_platform::Command;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// A registry base URL, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    base: String,
}

impl Registry {
    pub fn new(base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim();
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        Self { base }
    }

    /// Pick the registry: an explicit setting, then the package manager's
    /// environment, then `npm config get registry`, then the public registry.
    pub fn resolve(explicit: Option<&str>, from_env: Option<&str>) -> Self {
        let configured = explicit
            .or(from_env)
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if let Some(url) = configured {
            return Self::new(url);
        }
        match npm_config_registry() {
            Some(url) => Self::new(url),
            None => Self::default(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<registry><name>/-/<unscoped name>-<version>.tgz`
    pub fn tarball_url(&self, name: &str, version: &str) -> String {
        format!("{}{name}/-/{}-{version}.tgz", self.base, unscoped(name))
    }

    /// The registry document for one published version.
    pub fn manifest_url(&self, name: &str, version: &str) -> String {
        format!("{}{name}/{version}", self.base)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY)
    }
}

/// `@scope/name` -> `name`; unscoped names are returned as is.
pub fn unscoped(name: &str) -> &str {
    match name.strip_prefix('@') {
        Some(scoped) => scoped.split_once('/').map_or(name, |(_, rest)| rest),
        None => name,
    }
}

fn npm_config_registry() -> Option<String> {
    let output = match Command::new("npm").args(["config", "get", "registry"]).run() {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!(error = %err, "could not read the npm registry setting");
            return None;
        }
    };
    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!url.is_empty() && url != "undefined").then_some(url)
}
