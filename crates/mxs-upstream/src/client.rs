//! Authenticated HTTP client for the MaxScale REST API.
//!
//! One GET per call, bounded by a fixed timeout. No retries and no caching:
//! every scrape sees what the upstream reports at that moment.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use base64::Engine as _;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderValue, Method, Request, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{ConfigError, UpstreamError};
use crate::resource::ResourceKind;

/// Default budget for one upstream round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of raw resource collection bodies.
///
/// Implemented by [`UpstreamClient`]; collectors only depend on this trait.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Bytes, UpstreamError>>;
}

/// HTTP client bound to one MaxScale instance.
pub struct UpstreamClient {
    client: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    authorization: HeaderValue,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from a validated configuration.
    pub fn new(config: &UpstreamConfig, timeout: Duration) -> Result<Self, ConfigError> {
        config.validate()?;

        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", config.username, config.password));
        let mut authorization = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| ConfigError::Invalid(format!("credentials: {e}")))?;
        authorization.set_sensitive(true);

        let base_url = config.base_url();
        base_url
            .parse::<Uri>()
            .map_err(|e| ConfigError::Invalid(format!("host {:?}: {e}", config.host)))?;

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url,
            authorization,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of a resource collection.
    pub fn url_for(&self, kind: ResourceKind) -> String {
        format!("{}/v1/{}", self.base_url, kind.path())
    }

    /// GET a resource collection and return its body.
    ///
    /// Non-2xx responses are reported as [`UpstreamError::Status`].
    pub async fn get(&self, kind: ResourceKind) -> Result<Bytes, UpstreamError> {
        let url = self.url_for(kind);
        let uri: Uri = url
            .parse()
            .map_err(|e| UpstreamError::Request(format!("{url}: {e}")))?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, concat!("mxs-exporter/", env!("CARGO_PKG_VERSION")))
            .header(AUTHORIZATION, self.authorization.clone())
            .body(Empty::<Bytes>::new())
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let result = tokio::time::timeout(self.timeout, async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| UpstreamError::Unavailable {
                    url: url.clone(),
                    source: Box::new(e),
                })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(UpstreamError::Status {
                    url: url.clone(),
                    status,
                });
            }

            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| UpstreamError::Unavailable {
                    url: url.clone(),
                    source: Box::new(e),
                })?;
            Ok(body.to_bytes())
        })
        .await;

        match result {
            Ok(Ok(body)) => {
                debug!(%url, bytes = body.len(), "served upstream resource");
                Ok(body)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(UpstreamError::Timeout {
                url,
                after: self.timeout,
            }),
        }
    }
}

impl ResourceFetcher for UpstreamClient {
    fn fetch(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Bytes, UpstreamError>> {
        Box::pin(self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;

    // "admin:mariadb"
    const EXPECTED_AUTH: &str = "Basic YWRtaW46bWFyaWFkYg==";

    async fn servers(headers: HeaderMap) -> (StatusCode, &'static str) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        let accept = headers.get("accept").and_then(|v| v.to_str().ok());
        if auth != Some(EXPECTED_AUTH) || accept != Some("application/json") {
            return (StatusCode::UNAUTHORIZED, "unauthorized");
        }
        (StatusCode::OK, r#"{"data":[]}"#)
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        r#"{"data":[]}"#
    }

    /// Serve a fake upstream on an ephemeral port and return its port.
    async fn spawn_upstream() -> u16 {
        let app = Router::new()
            .route("/v1/servers", get(servers))
            .route("/v1/services", get(slow));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn config(port: u16, password: &str) -> UpstreamConfig {
        UpstreamConfig {
            username: "admin".to_string(),
            password: password.to_string(),
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    #[test]
    fn url_for_each_kind() {
        let client = UpstreamClient::new(&config(8989, "x"), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8989");
        assert_eq!(
            client.url_for(ResourceKind::Servers),
            "http://127.0.0.1:8989/v1/servers"
        );
        assert_eq!(
            client.url_for(ResourceKind::Services),
            "http://127.0.0.1:8989/v1/services"
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = config(8989, "x");
        cfg.host = "https://maxscale".to_string();
        assert!(UpstreamClient::new(&cfg, DEFAULT_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn fetch_sends_basic_auth() {
        let port = spawn_upstream().await;
        let client = UpstreamClient::new(&config(port, "mariadb"), DEFAULT_TIMEOUT).unwrap();

        let body = client.fetch(ResourceKind::Servers).await.unwrap();
        assert_eq!(&body[..], br#"{"data":[]}"#);
    }

    #[tokio::test]
    async fn fetch_reports_non_success_status() {
        let port = spawn_upstream().await;
        let client = UpstreamClient::new(&config(port, "wrong"), DEFAULT_TIMEOUT).unwrap();

        let err = client.fetch(ResourceKind::Servers).await.unwrap_err();
        match err {
            UpstreamError::Status { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let port = spawn_upstream().await;
        let client =
            UpstreamClient::new(&config(port, "mariadb"), Duration::from_millis(100)).unwrap();

        let err = client.fetch(ResourceKind::Services).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_unreachable_is_unavailable() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client =
            UpstreamClient::new(&config(port, "mariadb"), Duration::from_secs(2)).unwrap();
        let err = client.fetch(ResourceKind::Servers).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable { .. }), "got {err:?}");
    }
}
