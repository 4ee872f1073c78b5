//! HTTP handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tracing::debug;

use mxs_metrics::render_prometheus;

use crate::ApiState;

/// GET /metrics
///
/// Always 200: upstream failures show up as missing samples and
/// `mxs_exporter_scrape_success{kind} 0`, never as an HTTP error.
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let families = state.registry.gather().await;
    let body = render_prometheus(&families);
    debug!(bytes = body.len(), "metrics served");
    (
        StatusCode::OK,
        [(CONTENT_TYPE, mxs_metrics::CONTENT_TYPE)],
        body,
    )
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use bytes::Bytes;
    use mxs_metrics::Registry;
    use mxs_upstream::{BoxFuture, ResourceFetcher, ResourceKind, UpstreamError};
    use tower::ServiceExt;

    use crate::build_router;

    struct CannedFetcher(HashMap<ResourceKind, &'static str>);

    impl ResourceFetcher for CannedFetcher {
        fn fetch(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Bytes, UpstreamError>> {
            let result = self
                .0
                .get(&kind)
                .map(|body| Bytes::from_static(body.as_bytes()))
                .ok_or_else(|| UpstreamError::Unavailable {
                    url: format!("http://maxscale:8989/v1/{kind}"),
                    source: "connection refused".into(),
                });
            Box::pin(async move { result })
        }
    }

    fn router(bodies: &[(ResourceKind, &'static str)]) -> axum::Router {
        let fetcher = CannedFetcher(bodies.iter().copied().collect());
        build_router(Arc::new(Registry::new(Arc::new(fetcher))))
    }

    async fn get(router: axum::Router, uri: &str) -> (axum::http::StatusCode, String, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_renders_samples() {
        let router = router(&[
            (
                ResourceKind::Servers,
                r#"{"data":[{"id":"srv1","attributes":{"statistics":{"connections":5,"max_connections":100}}}]}"#,
            ),
            (ResourceKind::Services, r#"{"data":[]}"#),
        ]);

        let (status, content_type, body) = get(router, "/metrics").await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("s_connections{server=\"srv1\"} 5\n"));
        assert!(body.contains("s_max_connections{server=\"srv1\"} 100\n"));
        assert!(body.contains("mxs_exporter_scrape_success{kind=\"services\"} 1\n"));
    }

    #[tokio::test]
    async fn metrics_survives_upstream_failure() {
        let router = router(&[]);

        let (status, _, body) = get(router, "/metrics").await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("mxs_exporter_scrape_success{kind=\"servers\"} 0\n"));
        assert!(body.contains("mxs_exporter_scrape_success{kind=\"services\"} 0\n"));
        assert!(!body.contains("s_connections"));
    }

    #[tokio::test]
    async fn healthz_ok() {
        let (status, _, body) = get(router(&[]), "/healthz").await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _, _) = get(router(&[]), "/v1/servers").await;
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    }
}
