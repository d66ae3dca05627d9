//! Pulls one file out of a registry package tarball.
//!
//! Registry tarballs keep the package contents under a `package/` root and
//! use plain ustar headers, so a linear header scan is enough. Long-name
//! extensions and sparse entries are not understood.

mod codec;
mod error;
mod ustar;

pub use codec::decompress;
pub use error::{Error, Result};
pub use ustar::{BLOCK_SIZE, PACKAGE_ROOT, find_entry};

/// Decompress `archive` and return the bytes of `package/<subpath>`.
pub fn extract_file(archive: &[u8], subpath: &str) -> Result<Vec<u8>> {
    let tarball = decompress(archive)?;
    find_entry(&tarball, subpath).map(<[u8]>::to_vec)
}
