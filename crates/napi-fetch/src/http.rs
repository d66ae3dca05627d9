use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// What the fetch loop needs to know about one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// `Location` header, when present.
    pub location: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self {
            status,
            location: Some(location.into()),
            body: Bytes::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            location: None,
            body: Bytes::new(),
        }
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations must not follow redirects themselves; [`crate::fetch`]
/// does that so the hop limit is enforced in one place.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Issue a single GET and buffer the body.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).get(url)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::error::Error;

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .user_agent(concat!("napi-postinstall/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|err| Error::Transport {
                    url: String::new(),
                    message: err.to_string(),
                })?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            let transport = |err: reqwest::Error| Error::Transport {
                url: url.to_string(),
                message: err.to_string(),
            };
            let response = self.client.get(url).send().await.map_err(transport)?;
            let status = response.status().as_u16();
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await.map_err(transport)?;
            Ok(HttpResponse {
                status,
                location,
                body,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
