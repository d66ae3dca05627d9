use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Output, Stdio};

use crate::error::{Error, Result};

/// A process invocation that remembers how it was spelled for diagnostics.
#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
    args: Vec<String>,
}

impl Command {
    /// Resolve `program` on `PATH`, so Windows `.cmd` shims are found too.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let inner = match which::which(&program) {
            Ok(path) => StdCommand::new(path),
            Err(_) => StdCommand::new(&program),
        };
        Self {
            inner,
            program,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.env(key, val);
        self
    }

    pub fn env_remove(mut self, key: impl AsRef<OsStr>) -> Self {
        self.inner.env_remove(key);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.inner.current_dir(dir);
        self
    }

    /// Let the child write straight to our terminal.
    pub fn inherit_stdio(mut self) -> Self {
        self.inner
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        self
    }

    /// The command line as a user would type it.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion and capture output, whatever the exit status.
    pub fn output(mut self) -> Result<Output> {
        tracing::debug!(cmd = %self.display(), "running");
        self.inner.output().map_err(|source| Error::CommandFailed {
            cmd: self.display(),
            source,
        })
    }

    /// Run to completion and fail on a non-zero exit.
    pub fn run(self) -> Result<Output> {
        let cmd = self.display();
        let output = self.output()?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(Error::CommandStatus {
                cmd,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Run with inherited stdio and fail on a non-zero exit.
    pub fn status(mut self) -> Result<ExitStatus> {
        let cmd = self.display();
        tracing::debug!(cmd = %cmd, "running");
        let status = self.inner.status().map_err(|source| Error::CommandFailed {
            cmd: cmd.clone(),
            source,
        })?;
        if status.success() {
            Ok(status)
        } else {
            Err(Error::CommandStatus {
                cmd,
                status,
                stderr: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = Command::new("npm").arg("install").args(["--no-audit", "pkg@1.0.0"]);
        assert_eq!(cmd.display(), "npm install --no-audit pkg@1.0.0");
    }

    #[test]
    fn test_command_args_reach_process() {
        let cmd = Command::new("echo").arg("hello").arg("world");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_command_env_remove() {
        let cmd = Command::new("echo").env_remove("npm_config_global");
        let envs: Vec<_> = cmd.inner.get_envs().collect();
        assert_eq!(envs, [(OsStr::new("npm_config_global"), None)]);
    }

    #[test]
    fn test_command_current_dir() {
        let cmd = Command::new("echo").current_dir("/tmp");
        assert_eq!(cmd.inner.get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let err = Command::new("nonexistent_binary_12345").output().unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(err.to_string().contains("nonexistent_binary_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status() {
        let ok = Command::new("sh").args(["-c", "echo out"]).run().unwrap();
        assert_eq!(String::from_utf8_lossy(&ok.stdout).trim(), "out");

        let err = Command::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .run()
            .unwrap_err();
        match err {
            Error::CommandStatus { stderr, status, .. } => {
                assert_eq!(stderr, "boom");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_output_ignores_exit_status() {
        let output = Command::new("sh")
            .args(["-c", "echo musl >&2; exit 1"])
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("musl"));
    }
}
