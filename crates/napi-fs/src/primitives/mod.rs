pub mod relocate;
pub mod remove;
pub mod write;

pub use relocate::{ensure_dir, relocate};
pub use remove::remove_tree;
pub use write::{FileMode, read_file, write_file};
