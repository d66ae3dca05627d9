//! Shell-outs to the package manager.

use std::fmt;
use std::path::Path;

use napi_platform::{Command, Result as CommandResult, WASM32};

use crate::env::GLOBAL_VAR;
use crate::error::{Error, Result};

/// Name of this tool on the registry, as executors spell it.
pub const TOOL_NAME: &str = "napi-postinstall";

/// The package manager operations recovery relies on.
pub trait PackageManager {
    /// Install exactly `spec` into `dir`, which holds an empty manifest.
    ///
    /// `portable` requests the wasm32 build and overrides the CPU check.
    fn install_isolated(&self, dir: &Path, spec: &str, portable: bool) -> CommandResult<()>;

    /// `yarn add -D <spec>` in `cwd`.
    fn add_dev_dependency(&self, cwd: &Path, spec: &str) -> CommandResult<()>;

    /// Run this tool through `executor` in `dir`, attached to the terminal.
    fn run_executor(&self, executor: Executor, dir: &Path, args: &[String]) -> CommandResult<()>;
}

impl<T: PackageManager + ?Sized> PackageManager for &T {
    fn install_isolated(&self, dir: &Path, spec: &str, portable: bool) -> CommandResult<()> {
        (**self).install_isolated(dir, spec, portable)
    }

    fn add_dev_dependency(&self, cwd: &Path, spec: &str) -> CommandResult<()> {
        (**self).add_dev_dependency(cwd, spec)
    }

    fn run_executor(&self, executor: Executor, dir: &Path, args: &[String]) -> CommandResult<()> {
        (**self).run_executor(executor, dir, args)
    }
}

/// The real package manager binaries on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmCli;

impl PackageManager for NpmCli {
    fn install_isolated(&self, dir: &Path, spec: &str, portable: bool) -> CommandResult<()> {
        // a global parent install would make this one global too and deadlock on its lock
        Command::new("npm")
            .args(isolated_install_args(spec, portable))
            .current_dir(dir)
            .env_remove(GLOBAL_VAR)
            .run()
            .map(drop)
    }

    fn add_dev_dependency(&self, cwd: &Path, spec: &str) -> CommandResult<()> {
        Command::new("yarn")
            .args(["add", "-D", spec])
            .current_dir(cwd)
            .run()
            .map(drop)
    }

    fn run_executor(&self, executor: Executor, dir: &Path, args: &[String]) -> CommandResult<()> {
        let (program, prefix) = executor.command();
        Command::new(program)
            .args(prefix)
            .args(args)
            .current_dir(dir)
            .inherit_stdio()
            .status()
            .map(drop)
    }
}

/// Arguments for the nested `npm install`.
pub fn isolated_install_args(spec: &str, portable: bool) -> Vec<String> {
    let mut args: Vec<String> = [
        "install",
        "--loglevel=error",
        "--prefer-offline",
        "--no-audit",
        "--progress=false",
    ]
    .map(String::from)
    .to_vec();
    if portable {
        args.push(format!("--cpu={WASM32}"));
        args.push("--force".to_string());
    }
    args.push(spec.to_string());
    args
}

/// How each package manager runs a published binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    Npm,
    Pnpm,
    Yarn,
    Bun,
    Deno,
}

impl Executor {
    pub const ALL: [Executor; 5] = [Self::Npm, Self::Pnpm, Self::Yarn, Self::Bun, Self::Deno];

    pub fn name(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
            Self::Deno => "deno",
        }
    }

    /// Pick the executor for the invoking package manager; npm when unknown.
    pub fn from_package_manager(name: Option<&str>) -> Result<Self> {
        let Some(name) = name else {
            return Ok(Self::Npm);
        };
        Self::ALL
            .into_iter()
            .find(|executor| executor.name() == name)
            .ok_or_else(|| Error::UnsupportedPackageManager {
                agent: name.to_string(),
                supported: Self::ALL.iter().map(|executor| executor.name()).collect(),
            })
    }

    /// Program and leading arguments that run this tool.
    pub fn command(self) -> (&'static str, Vec<String>) {
        match self {
            Self::Npm => ("npx", vec![TOOL_NAME.to_string()]),
            Self::Pnpm => ("pnpm", vec![TOOL_NAME.to_string()]),
            Self::Yarn => ("yarn", vec![TOOL_NAME.to_string()]),
            Self::Bun => ("bun", vec![TOOL_NAME.to_string()]),
            Self::Deno => ("deno", vec!["run".to_string(), format!("npm:{TOOL_NAME}")]),
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
