use bytes::Bytes;
use url::Url;

use crate::error::{Error, Result};
use crate::http::HttpClient;

pub const DEFAULT_REDIRECT_LIMIT: usize = 10;

/// Redirect statuses the registry and its CDNs answer with.
pub fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307 | 308)
}

/// GET `url`, following at most `redirect_limit` redirects, and return the
/// body of the final `200` response.
pub async fn fetch<C: HttpClient>(client: &C, url: &str, redirect_limit: usize) -> Result<Bytes> {
    let mut current = url.to_string();

    for _ in 0..=redirect_limit {
        let response = client.get(&current).await?;

        let location = response
            .location
            .as_deref()
            .filter(|_| is_redirect(response.status));
        if let Some(location) = location {
            let next = resolve_location(&current, location)?;
            tracing::debug!(
                from = %current,
                to = %next,
                status = response.status,
                "following redirect"
            );
            current = next;
            continue;
        }

        if response.status != 200 {
            return Err(Error::Status {
                url: current,
                status: response.status,
            });
        }
        tracing::debug!(url = %current, bytes = response.body.len(), "fetched");
        return Ok(response.body);
    }

    Err(Error::TooManyRedirects {
        url: url.to_string(),
        limit: redirect_limit,
    })
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(base: &str, location: &str) -> Result<String> {
    let invalid = || Error::InvalidRedirect {
        url: base.to_string(),
        location: location.to_string(),
    };
    let base = Url::parse(base).map_err(|_| invalid())?;
    let next = base.join(location).map_err(|_| invalid())?;
    Ok(next.into())
}
