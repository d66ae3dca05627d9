//! C runtime detection for Linux hosts.
//!
//! Stages run in order and the first conclusive answer wins:
//!
//! 1. the `ldd` script on disk names musl or not
//! 2. the libraries mapped into this process name a libc
//! 3. `ldd --version` output mentions musl
//!
//! When every stage is inconclusive the host is treated as glibc.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::command::Command;

const LDD_PATH: &str = "/usr/bin/ldd";
const MAPS_PATH: &str = "/proc/self/maps";

/// Anything that can answer "is this a musl host?".
pub trait LibcProbe {
    fn is_musl(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Libc {
    Glibc,
    Musl,
}

impl LibcProbe for Libc {
    fn is_musl(&self) -> bool {
        matches!(self, Libc::Musl)
    }
}

/// Probes the running system once and caches the answer for the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLibc;

static IS_MUSL: Lazy<bool> = Lazy::new(|| {
    if !cfg!(target_os = "linux") {
        return false;
    }
    let stages: [&dyn Fn() -> Option<bool>; 3] = [
        &|| from_ldd_script(Path::new(LDD_PATH)),
        &|| from_mapped_objects(Path::new(MAPS_PATH)),
        &from_ldd_version,
    ];
    let musl = first_conclusive(&stages);
    tracing::debug!(musl, "probed libc");
    musl
});

impl LibcProbe for SystemLibc {
    fn is_musl(&self) -> bool {
        *IS_MUSL
    }
}

impl SystemLibc {
    pub fn libc(&self) -> Libc {
        if self.is_musl() { Libc::Musl } else { Libc::Glibc }
    }
}

fn first_conclusive(stages: &[&dyn Fn() -> Option<bool>]) -> bool {
    stages.iter().find_map(|stage| stage()).unwrap_or(false)
}

fn is_musl_object(name: &str) -> bool {
    name.contains("libc.musl-") || name.contains("ld-musl-")
}

fn is_glibc_object(name: &str) -> bool {
    name.contains("libc.so.6") || name.contains("ld-linux")
}

/// Unreadable script is inconclusive; a readable one always answers.
fn from_ldd_script(path: &Path) -> Option<bool> {
    let content = fs::read(path).ok()?;
    Some(String::from_utf8_lossy(&content).contains("musl"))
}

/// Look for a libc among the objects mapped into this process.
///
/// A statically linked binary maps neither, which leaves the question open.
fn from_mapped_objects(maps: &Path) -> Option<bool> {
    let content = fs::read_to_string(maps).ok()?;
    let mut glibc = false;
    for line in content.lines() {
        let Some(object) = line.split_whitespace().nth(5) else {
            continue;
        };
        if is_musl_object(object) {
            return Some(true);
        }
        glibc |= is_glibc_object(object);
    }
    glibc.then_some(false)
}

fn from_ldd_version() -> Option<bool> {
    // musl's ldd prints its banner to stderr and exits non-zero
    let output = Command::new("ldd").arg("--version").output().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Some(stdout.contains("musl") || stderr.contains("musl"))
}
