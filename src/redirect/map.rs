//! Direct path-to-URL redirect handler.
//!
//! # Responsibilities
//! - Look up the full request target (path and query) in a `RedirectTable`
//! - Answer hits with `301 Moved Permanently`
//! - Hand misses to the fallback service, untouched
//!
//! # Design Decisions
//! - The fallback is any tower `Service`, so axum routers, handlers and
//!   other `MapHandler`s can all sit behind a table
//! - The table sits behind an `Arc`; clones of the handler share it
//! - Target URLs are issued verbatim, never validated

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::{self, BoxFuture, FutureExt};
use tower::{Service, ServiceExt};

use crate::observability::metrics;
use crate::redirect::table::RedirectTable;

/// Request handler that redirects mapped paths and defers everything else.
#[derive(Debug, Clone)]
pub struct MapHandler<F> {
    table: Arc<RedirectTable>,
    fallback: F,
}

impl<F> MapHandler<F> {
    /// Create a handler from `(path, url)` pairs and a fallback service.
    pub fn new<I, K, V>(mapping: I, fallback: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_table(RedirectTable::from_pairs(mapping), fallback)
    }

    /// Create a handler around an already built table.
    pub fn from_table(table: RedirectTable, fallback: F) -> Self {
        Self {
            table: Arc::new(table),
            fallback,
        }
    }

    pub fn table(&self) -> &RedirectTable {
        &self.table
    }
}

/// Wrap a path-to-URL mapping and a fallback into a request handler.
pub fn map_handler<I, K, V, F>(mapping: I, fallback: F) -> MapHandler<F>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    MapHandler::new(mapping, fallback)
}

impl<F> Service<Request<Body>> for MapHandler<F>
where
    F: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    F::Response: IntoResponse,
    F::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the fallback is driven by `oneshot` on the miss path.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        {
            let target = request_target(&req);

            if let Some(url) = self.table.lookup(&target) {
                tracing::debug!(path = %target, target = %url, "Redirecting");
                metrics::record_redirect(&target);
                return future::ready(Ok(redirect_response(url, req.method()))).boxed();
            }

            tracing::trace!(path = %target, "No redirect mapped, calling fallback");
        }
        metrics::record_fallback();

        // Take the instance that may have been driven to readiness and leave a clone behind.
        let clone = self.fallback.clone();
        let fallback = std::mem::replace(&mut self.fallback, clone);

        async move {
            let response = fallback.oneshot(req).await?;
            Ok(response.into_response())
        }
        .boxed()
    }
}

/// Request target as the client sent it: path plus query for origin-form,
/// the whole URI for absolute-form (`GET http://host/a`).
fn request_target(req: &Request<Body>) -> Cow<'_, str> {
    let uri = req.uri();
    match uri.path_and_query() {
        Some(pq) if uri.scheme().is_none() => Cow::Borrowed(pq.as_str()),
        _ => Cow::Owned(uri.to_string()),
    }
}

fn redirect_response(url: &str, method: &Method) -> Response {
    let location = location_header(url);

    let mut response = if method == Method::GET || method == Method::HEAD {
        let body = format!("<a href=\"{}\">Moved Permanently</a>.\n\n", html_escape(url));
        let mut response = (StatusCode::MOVED_PERMANENTLY, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    } else {
        (StatusCode::MOVED_PERMANENTLY, Body::empty()).into_response()
    };

    response.headers_mut().insert(header::LOCATION, location);
    response
}

/// Build the `Location` value, percent-encoding control characters that can
/// never appear in a header.
fn location_header(url: &str) -> HeaderValue {
    if let Ok(value) = HeaderValue::from_bytes(url.as_bytes()) {
        return value;
    }

    let mut encoded = String::with_capacity(url.len() + 8);
    for c in url.chars() {
        if c.is_ascii_control() {
            encoded.push_str(&format!("%{:02X}", c as u32));
        } else {
            encoded.push(c);
        }
    }
    HeaderValue::from_bytes(encoded.as_bytes()).unwrap_or(HeaderValue::from_static(""))
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use axum::Router;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fallback that counts its calls and echoes the URI it was handed.
    fn counting_fallback(calls: Arc<AtomicUsize>) -> Router {
        Router::new().fallback(move |uri: Uri, req: Request<Body>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let marker = req
                    .headers()
                    .get("x-marker")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string();
                (StatusCode::NOT_FOUND, format!("fallback {uri} {marker}"))
            }
        })
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_mapped_path_redirects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut paths = HashMap::new();
        paths.insert(
            "/urlshort-godoc",
            "https://godoc.org/github.com/gophercises/urlshort",
        );
        paths.insert("/yaml-godoc", "https://godoc.org/gopkg.in/yaml.v2");
        let handler = map_handler(paths, counting_fallback(calls.clone()));

        let response = handler.oneshot(get("/yaml-godoc")).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://godoc.org/gopkg.in/yaml.v2"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unmapped_path_reaches_fallback_untouched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = map_handler(
            [("/a", "https://example.com/a")],
            counting_fallback(calls.clone()),
        );

        let req = Request::builder()
            .uri("/b?x=1")
            .header("x-marker", "kept")
            .body(Body::empty())
            .unwrap();
        let response = handler.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "fallback /b?x=1 kept");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_mapping_always_falls_back() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = map_handler(
            HashMap::<String, String>::new(),
            counting_fallback(calls.clone()),
        );

        for path in ["/", "/a", "/a/b?c=d", "/%20"] {
            let response = handler.clone().oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_the_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = map_handler(
            [("/search?q=rust", "https://www.rust-lang.org/")],
            counting_fallback(calls.clone()),
        );

        let hit = handler.clone().oneshot(get("/search?q=rust")).await.unwrap();
        assert_eq!(hit.status(), StatusCode::MOVED_PERMANENTLY);

        let miss = handler.oneshot(get("/search")).await.unwrap();
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absolute_form_matches_whole_uri() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = map_handler(
            [
                ("http://short.example/a", "https://example.com/absolute"),
                ("/b", "https://example.com/origin"),
            ],
            counting_fallback(calls.clone()),
        );

        let hit = handler
            .clone()
            .oneshot(get("http://short.example/a"))
            .await
            .unwrap();
        assert_eq!(hit.headers()[header::LOCATION], "https://example.com/absolute");

        let miss = handler.oneshot(get("http://short.example/b")).await.unwrap();
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_path_normalization() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = map_handler(
            [("/docs", "https://example.com/docs")],
            counting_fallback(calls.clone()),
        );

        for path in ["/docs/", "/Docs", "//docs"] {
            let response = handler.clone().oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_get_redirect_has_html_body() {
        let handler = map_handler(
            [("/x", "https://example.com/?a=1&b=2")],
            counting_fallback(Default::default()),
        );

        let response = handler.oneshot(get("/x")).await.unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            body_string(response).await,
            "<a href=\"https://example.com/?a=1&amp;b=2\">Moved Permanently</a>.\n\n"
        );
    }

    #[tokio::test]
    async fn test_post_redirect_has_empty_body() {
        let handler = map_handler([("/x", "/y")], counting_fallback(Default::default()));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/x")
            .body(Body::empty())
            .unwrap();
        let response = handler.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/y");
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_targets_are_not_validated() {
        let handler = map_handler(
            [("/empty", ""), ("/junk", "not a url at all")],
            counting_fallback(Default::default()),
        );

        let empty = handler.clone().oneshot(get("/empty")).await.unwrap();
        assert_eq!(empty.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(empty.headers()[header::LOCATION], "");

        let junk = handler.oneshot(get("/junk")).await.unwrap();
        assert_eq!(junk.headers()[header::LOCATION], "not a url at all");
    }

    #[tokio::test]
    async fn test_hits_and_misses_are_counted() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let metrics_handle = recorder.handle();
        let mut handler = map_handler(
            [("/x", "https://example.com/x")],
            counting_fallback(Default::default()),
        );

        // Counters are recorded in `call`, before the response future runs.
        let (hit, miss) = ::metrics::with_local_recorder(&recorder, || {
            (handler.call(get("/x")), handler.call(get("/y")))
        });
        assert_eq!(hit.await.unwrap().status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(miss.await.unwrap().status(), StatusCode::NOT_FOUND);

        let rendered = metrics_handle.render();
        assert!(
            rendered.contains("urlshort_redirects_total{path=\"/x\"} 1"),
            "{rendered}"
        );
        assert!(rendered.contains("urlshort_fallbacks_total 1"), "{rendered}");
        assert!(!rendered.contains("path=\"/y\""), "{rendered}");
    }

    #[test]
    fn test_location_encodes_control_characters() {
        assert_eq!(location_header("https://a/b\r\nc"), "https://a/b%0D%0Ac");
        assert_eq!(
            location_header("https://example.com/ok"),
            "https://example.com/ok"
        );
    }

    #[tokio::test]
    async fn test_handlers_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = map_handler(
            [("/inner", "https://example.com/inner")],
            counting_fallback(calls.clone()),
        );
        let outer = map_handler([("/outer", "https://example.com/outer")], inner);

        let response = outer.clone().oneshot(get("/inner")).await.unwrap();
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/inner"
        );

        let response = outer.clone().oneshot(get("/outer")).await.unwrap();
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/outer"
        );

        let response = outer.oneshot(get("/neither")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
