//! Target triple parsing and host target detection for native addons.
//!
//! - [`target`] turns compiler target triples into `platform-arch[-abi]` keys
//! - [`host`] lists the keys the running host accepts, best match first
//! - [`libc`] decides between glibc and musl on Linux
//! - [`command`] wraps process spawning for the package-manager shell-outs

pub use command::Command;
pub use error::{Error, Result};
pub use host::{acceptable_targets, native_targets, Host};
pub use libc::{Libc, LibcProbe, SystemLibc};
pub use target::{Arch, Platform, Target, EABI, WASI, WASM32, WASM32_WASI};

pub mod command;
mod error;
pub mod host;
pub mod libc;
pub mod target;
