use std::collections::HashMap;
use std::sync::Mutex;

use napi_fetch::{Error, HttpClient, HttpResponse, Registry, Result, fetch};

#[derive(Default)]
struct MockClient {
    routes: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    fn route(mut self, url: &str, response: HttpResponse) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some(response) => Ok(response.clone()),
            None => Ok(HttpResponse::status(404)),
        }
    }
}

#[tokio::test]
async fn test_fetch_plain_ok() {
    let client = MockClient::default().route("https://r.test/a.tgz", HttpResponse::ok("payload"));
    let body = fetch(&client, "https://r.test/a.tgz", 10).await.unwrap();
    assert_eq!(&body[..], b"payload");
}

#[tokio::test]
async fn test_fetch_follows_redirect_chain() {
    let client = MockClient::default()
        .route("https://r.test/a.tgz", HttpResponse::redirect(302, "https://cdn.test/a.tgz"))
        .route("https://cdn.test/a.tgz", HttpResponse::redirect(308, "/blobs/a.tgz"))
        .route("https://cdn.test/blobs/a.tgz", HttpResponse::ok("payload"));

    let body = fetch(&client, "https://r.test/a.tgz", 10).await.unwrap();
    assert_eq!(&body[..], b"payload");
    assert_eq!(
        client.requests(),
        [
            "https://r.test/a.tgz",
            "https://cdn.test/a.tgz",
            "https://cdn.test/blobs/a.tgz"
        ]
    );
}

#[tokio::test]
async fn test_fetch_rejects_non_200() {
    let client = MockClient::default();
    let err = fetch(&client, "https://r.test/missing.tgz", 10).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "Server responded with 404");
}

#[tokio::test]
async fn test_redirect_without_location_is_an_error_status() {
    let client = MockClient::default().route("https://r.test/a.tgz", HttpResponse::status(301));
    let err = fetch(&client, "https://r.test/a.tgz", 10).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 301, .. }));
}

#[tokio::test]
async fn test_redirect_loop_is_capped() {
    let client = MockClient::default()
        .route("https://r.test/a", HttpResponse::redirect(302, "https://r.test/b"))
        .route("https://r.test/b", HttpResponse::redirect(302, "https://r.test/a"));

    let err = fetch(&client, "https://r.test/a", 3).await.unwrap_err();
    assert!(matches!(err, Error::TooManyRedirects { limit: 3, .. }));
    assert_eq!(client.requests().len(), 4);
}

#[tokio::test]
async fn test_relative_redirect_is_resolved_like_a_browser() {
    let client = MockClient::default()
        .route(
            "https://r.test/acme/-/acme-1.0.0.tgz?token=abc",
            HttpResponse::redirect(302, "../../blobs/acme.tgz"),
        )
        .route("https://r.test/blobs/acme.tgz", HttpResponse::ok("payload"));

    let body = fetch(&client, "https://r.test/acme/-/acme-1.0.0.tgz?token=abc", 10)
        .await
        .unwrap();
    assert_eq!(&body[..], b"payload");
}

#[tokio::test]
async fn test_zero_limit_still_allows_direct_hit() {
    let client = MockClient::default().route("https://r.test/a", HttpResponse::ok("x"));
    assert!(fetch(&client, "https://r.test/a", 0).await.is_ok());
}

#[tokio::test]
async fn test_fetch_registry_tarball() {
    let registry = Registry::new("https://r.test");
    let url = registry.tarball_url("@acme/core-linux-x64-gnu", "1.2.3");
    assert_eq!(url, "https://r.test/@acme/core-linux-x64-gnu/-/core-linux-x64-gnu-1.2.3.tgz");

    let client = MockClient::default().route(&url, HttpResponse::ok(vec![0x1f, 0x8b]));
    let body = fetch(&client, &url, 10).await.unwrap();
    assert_eq!(&body[..], [0x1f, 0x8b]);
}
