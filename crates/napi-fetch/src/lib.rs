//! Registry access for native addon recovery.
//!
//! [`HttpClient`] is the seam between the recovery code and the network;
//! [`fetch`] layers redirect handling on top of it and [`Registry`] knows how
//! registry URLs are laid out.

mod error;
mod fetch;
mod http;
pub mod registry;

pub use error::{Error, Result};
pub use fetch::{DEFAULT_REDIRECT_LIMIT, fetch, is_redirect};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{HttpClient, HttpResponse};
pub use registry::{DEFAULT_REGISTRY, Registry, unscoped};
