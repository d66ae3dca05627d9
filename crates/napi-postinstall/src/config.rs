//! Layered settings: built-in defaults, then `napi-postinstall.toml` in the
//! working directory, then `NAPI_POSTINSTALL_*` variables, then flags.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use napi_fetch::DEFAULT_REDIRECT_LIMIT;
use serde::{Deserialize, Serialize};

use crate::cli::GlobalArgs;

pub const CONFIG_FILE: &str = "napi-postinstall.toml";
pub const ENV_PREFIX: &str = "NAPI_POSTINSTALL_";
pub const DEFAULT_LOG: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Registry base URL; `npm_config_registry` and npm itself are asked when unset.
    pub registry: Option<String>,
    /// Patch state file; defaults to `node_modules/.cache` under the working directory.
    pub state_file: Option<PathBuf>,
    pub redirect_limit: usize,
    /// `tracing` filter directives.
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: None,
            state_file: None,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            log: DEFAULT_LOG.to_string(),
        }
    }
}

/// Flags that override every other layer when given.
#[derive(Debug, Default, Serialize)]
struct Overrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    registry: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_file: Option<&'a Path>,
}

impl Settings {
    pub fn figment(cwd: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(cwd.join(CONFIG_FILE)))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(cwd: &Path, args: &GlobalArgs) -> Result<Self, figment::Error> {
        let overrides = Overrides {
            registry: args.registry.as_deref(),
            state_file: args.state_file.as_deref(),
        };
        Self::figment(cwd).merge(Serialized::defaults(overrides)).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let settings = Settings::load(jail.directory(), &GlobalArgs::default())?;
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.redirect_limit, 10);
            Ok(())
        });
    }

    #[test]
    fn test_layers_override_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                registry = "https://file.test/"
                redirect_limit = 3
                log = "debug"
                "#,
            )?;
            jail.set_env("NAPI_POSTINSTALL_REDIRECT_LIMIT", "5");

            let settings = Settings::load(jail.directory(), &GlobalArgs::default())?;
            assert_eq!(settings.registry.as_deref(), Some("https://file.test/"));
            assert_eq!(settings.redirect_limit, 5);
            assert_eq!(settings.log, "debug");

            let args = GlobalArgs {
                registry: Some("https://flag.test/".into()),
                state_file: Some("state.json".into()),
                ..GlobalArgs::default()
            };
            let settings = Settings::load(jail.directory(), &args)?;
            assert_eq!(settings.registry.as_deref(), Some("https://flag.test/"));
            assert_eq!(settings.state_file.as_deref(), Some(Path::new("state.json")));
            assert_eq!(settings.redirect_limit, 5);
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("NAPI_POSTINSTALL_REDIRECT_LIMIT", "many");
            assert!(Settings::load(jail.directory(), &GlobalArgs::default()).is_err());
            Ok(())
        });
    }
}
