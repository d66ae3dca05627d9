use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(
    name = "napi-postinstall",
    version = env!("CARGO_PKG_VERSION"),
    about,
    long_about = None,
    propagate_version = true,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Option<Commands>,

    #[command(flatten)]
    pub install: InstallArg,
}

#[derive(Clone, Debug, Default, Args)]
pub struct GlobalArgs {
    /// Registry base URL
    #[arg(long, global = true)]
    pub registry: Option<String>,

    /// Where to remember patched packages
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Pretend to run on this platform (linux, darwin, win32, ...)
    #[arg(long, global = true)]
    pub platform: Option<String>,

    /// Pretend to run on this architecture (x64, arm64, ...)
    #[arg(long, global = true)]
    pub arch: Option<String>,
}

/// Make sure the native binary of a package is installed.
#[derive(Clone, Debug, Args)]
pub struct InstallArg {
    /// Package name
    #[arg(required = true)]
    pub name: Option<String>,

    /// Package version, needed when the manifest has to come from the registry
    #[arg(id = "package_version", value_name = "VERSION")]
    pub version: Option<String>,

    /// `1`, `check`, `true` or `yes` to require matching versions
    pub check: Option<String>,
}

impl InstallArg {
    pub fn strict(&self) -> bool {
        self.check.as_deref().is_some_and(is_truthy)
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "check" | "true" | "yes")
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Print the target keys this host accepts, best first
    #[command(alias = "t", name = "targets")]
    Targets,

    /// Parse target triples and print them as JSON
    #[command(alias = "p", name = "parse")]
    Parse {
        #[arg(required = true)]
        triples: Vec<String>,
    },

    /// Run the tool through the invoking package manager's executor
    #[command(name = "delegate")]
    Delegate {
        /// Path to the package's package.json
        package_json: PathBuf,

        /// Require matching versions
        #[arg(long)]
        check: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        App::command().debug_assert();
    }

    #[test]
    fn test_install_positionals() {
        let app =
            App::try_parse_from(["napi-postinstall", "@acme/core", "1.2.3", "check"]).unwrap();
        assert!(app.cmd.is_none());
        assert_eq!(app.install.name.as_deref(), Some("@acme/core"));
        assert_eq!(app.install.version.as_deref(), Some("1.2.3"));
        assert!(app.install.strict());

        let app = App::try_parse_from(["napi-postinstall", "acme", "1.2.3", "0"]).unwrap();
        assert!(!app.install.strict());

        let app = App::try_parse_from(["napi-postinstall", "acme"]).unwrap();
        assert!(app.install.version.is_none());
        assert!(!app.install.strict());
    }

    #[test]
    fn test_name_required_without_subcommand() {
        assert!(App::try_parse_from(["napi-postinstall"]).is_err());
    }

    #[test]
    fn test_subcommands() {
        let app = App::try_parse_from([
            "napi-postinstall",
            "parse",
            "x86_64-unknown-linux-gnu",
            "wasm32-wasip1",
        ])
        .unwrap();
        match app.cmd {
            Some(Commands::Parse { triples }) => assert_eq!(triples.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }

        let app = App::try_parse_from([
            "napi-postinstall",
            "delegate",
            "node_modules/acme/package.json",
            "--check",
            "--registry",
            "https://r.test",
        ])
        .unwrap();
        assert_eq!(app.global.registry.as_deref(), Some("https://r.test"));
        assert!(matches!(app.cmd, Some(Commands::Delegate { check: true, .. })));

        let app = App::try_parse_from([
            "napi-postinstall",
            "targets",
            "--platform",
            "linux",
            "--arch",
            "arm64",
        ])
        .unwrap();
        assert!(matches!(app.cmd, Some(Commands::Targets)));
        assert_eq!(app.global.platform.as_deref(), Some("linux"));
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "check", "true", "yes"] {
            assert!(is_truthy(value));
        }
        for value in ["0", "false", "no", "", "TRUE"] {
            assert!(!is_truthy(value));
        }
    }
}
