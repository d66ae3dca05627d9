//! Filesystem primitives for placing native addon binaries.
//!
//! Every write that lands on a final destination goes through a temporary
//! sibling and a rename, so a reader never observes a half-written binary.

mod error;
pub mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use primitives::{FileMode, ensure_dir, read_file, relocate, remove_tree, write_file};
pub use workspace::Workspace;
