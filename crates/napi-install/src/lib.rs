//! Makes sure the native addon binary of a napi package is on disk.
//!
//! [`Installer`] walks the targets the host accepts, checks whether the
//! matching sub-package is installed and otherwise runs the recovery chain
//! ([`Strategy::CHAIN`]). [`delegate`] covers environments where the work has
//! to be handed to the package manager's executor instead.

mod delegate;
pub mod env;
mod error;
mod installer;
pub mod layout;
pub mod package_manager;
pub mod state;
pub mod strategy;

pub use delegate::delegate;
pub use env::Environment;
pub use error::{Error, Result};
pub use installer::{Installer, Outcome};
pub use package_manager::{Executor, NpmCli, PackageManager};
pub use state::{FilePatchStore, MemoryPatchStore, PatchStore};
pub use strategy::{Candidate, Strategy, StrategyOutcome};
