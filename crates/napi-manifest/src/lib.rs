//! `package.json` handling for packages that ship native addons.

mod addon;
mod error;
mod manifest;

pub use addon::{NativeAddonInfo, extract_native_addon_info};
pub use error::{Error, Result};
pub use manifest::{LegacyPackage, LegacyTriples, NapiConfig, PACKAGE_JSON, PackageManifest};
