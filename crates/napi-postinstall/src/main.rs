mod cli;
mod config;
mod logging;

use std::convert::Infallible;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use napi_fetch::{Registry, ReqwestClient};
use napi_install::{Environment, FilePatchStore, Installer, NpmCli, Outcome, delegate};
use napi_platform::{Host, SystemLibc, Target, acceptable_targets};

use crate::cli::{App, Commands, GlobalArgs, InstallArg};
use crate::config::{DEFAULT_LOG, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let app = App::parse();
    let env = Environment::from_process();
    let settings = match &env {
        Ok(env) => Settings::load(&env.cwd, &app.global).map_err(anyhow::Error::from),
        Err(_) => Ok(Settings::default()),
    };
    logging::init(settings.as_ref().map_or(DEFAULT_LOG, |s| s.log.as_str()));

    let result = match (env, settings) {
        (Ok(env), Ok(settings)) => run(app, env, settings).await,
        (Err(err), _) => {
            Err(anyhow::Error::new(err).context("failed to read the working directory"))
        }
        (_, Err(err)) => Err(err.context("invalid configuration")),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(app: App, env: Environment, settings: Settings) -> Result<()> {
    match app.cmd {
        Some(Commands::Targets) => {
            for target in acceptable_targets(&host(&app.global), &SystemLibc) {
                println!("{target}");
            }
            Ok(())
        }
        Some(Commands::Parse { triples }) => {
            for triple in triples {
                println!("{}", serde_json::to_string_pretty(&Target::parse(&triple))?);
            }
            Ok(())
        }
        Some(Commands::Delegate { package_json, check }) => {
            let store = patch_store(&settings, &env.cwd);
            let ran = delegate(&package_json, check, &env, &NpmCli, &store)
                .with_context(|| format!("failed to delegate {}", package_json.display()))?;
            if !ran {
                tracing::debug!("already patched, nothing delegated");
            }
            Ok(())
        }
        None => install(&app.global, app.install, env, settings).await,
    }
}

async fn install(
    global: &GlobalArgs,
    arg: InstallArg,
    env: Environment,
    settings: Settings,
) -> Result<()> {
    let name = arg.name.as_deref().context("a package name is required")?;
    let strict = arg.strict();
    let targets = acceptable_targets(&host(global), &SystemLibc);
    let registry = Registry::resolve(settings.registry.as_deref(), env.registry.as_deref());
    let store = patch_store(&settings, &env.cwd);
    let client = ReqwestClient::new()?;

    let installer = Installer::new(env, targets, registry, client, NpmCli, store)
        .redirect_limit(settings.redirect_limit);
    match installer
        .check_and_prepare_package(name, arg.version.as_deref(), strict)
        .await?
    {
        Outcome::Present { package, path } => {
            tracing::debug!(%package, path = %path.display(), "binary already installed")
        }
        Outcome::AlreadyPatched { package } => tracing::debug!(%package, "already patched"),
        Outcome::Recovered { package, strategy, path } => {
            tracing::info!("installed {package} via {strategy} at {}", path.display())
        }
        Outcome::Deferred { package } => tracing::debug!(%package, "managed by Plug'n'Play"),
        Outcome::NothingDeclared => {}
    }
    Ok(())
}

fn host(args: &GlobalArgs) -> Host {
    let detected = Host::detect();
    let platform = match &args.platform {
        Some(platform) => platform.parse().unwrap_or_else(|never: Infallible| match never {}),
        None => detected.platform,
    };
    let arch = match &args.arch {
        Some(arch) => arch.parse().unwrap_or_else(|never: Infallible| match never {}),
        None => detected.arch,
    };
    Host::new(platform, arch)
}

fn patch_store(settings: &Settings, cwd: &Path) -> FilePatchStore {
    let path = match &settings.state_file {
        Some(path) if path.is_relative() => cwd.join(path),
        Some(path) => path.clone(),
        None => FilePatchStore::default_path(cwd),
    };
    FilePatchStore::new(path)
}
